use log::{debug, error, info};
use rocket::serde::json::Json;
use rocket::{delete, get, post, put, routes, Route, State};

use super::channels::{Channel, ChannelUpdate, Comment, NewChannel, NewComment};
use super::errors::Error;
use super::service::{ChannelService, ServiceError};

type ApiResult<T> = Result<Json<T>, Error>;

pub fn routes() -> Vec<Route> {
    routes![
        get_all_channels,
        get_channel,
        delete_channel,
        create_channel,
        update_channel,
        search_by_title,
        search_by_quality,
        get_hot_channels,
        add_comment,
        hot_comments,
    ]
}

#[get("/")]
async fn get_all_channels(service: &State<ChannelService>) -> ApiResult<Vec<Channel>> {
    info!("Fetching every channel");
    let results = service.get_all_channels().await?;
    debug!("Found {} channels", results.len());
    Ok(Json(results))
}

#[get("/<id>")]
async fn get_channel(service: &State<ChannelService>, id: &str) -> ApiResult<Channel> {
    info!("Fetching channel {id}");
    match service.get_channel(id).await {
        Ok(channel) => Ok(Json(channel)),
        Err(err) => {
            if let ServiceError::NotFound(_) = err {
                error!("Channel {id} not found");
            }
            Err(err.into())
        }
    }
}

#[delete("/<id>")]
async fn delete_channel(service: &State<ChannelService>, id: &str) -> Result<&'static str, Error> {
    info!("Deleting channel {id}");
    if service.delete_channel(id).await? {
        Ok("deleted")
    } else {
        Ok("failed")
    }
}

#[post("/", data = "<channel>")]
async fn create_channel(
    service: &State<ChannelService>,
    channel: Json<NewChannel>,
) -> ApiResult<Channel> {
    info!("Creating channel {:?}", channel.0);
    Ok(Json(service.create_channel(channel.into_inner()).await?))
}

#[put("/", data = "<update>")]
async fn update_channel(
    service: &State<ChannelService>,
    update: Json<ChannelUpdate>,
) -> ApiResult<Channel> {
    info!("Updating channel {:?}", update.0);
    Ok(Json(service.update_channel(update.into_inner()).await?))
}

// `/t/<title>` and `/q/<quality>` overlap `/<channel_id>/hotcomments` and the searches
// win, so the hot comments of channels with id `t` or `q` are unreachable. Likewise
// `/hot` shadows `GET /<id>` for a channel with id `hot`.
#[get("/t/<title>", rank = 1)]
async fn search_by_title(service: &State<ChannelService>, title: &str) -> ApiResult<Vec<Channel>> {
    info!("Searching channels titled {title}");
    Ok(Json(service.search_by_title(title).await?))
}

#[get("/q/<quality>", rank = 1)]
async fn search_by_quality(
    service: &State<ChannelService>,
    quality: &str,
) -> ApiResult<Vec<Channel>> {
    info!("Searching channels of quality {quality}");
    Ok(Json(service.search_by_quality(quality).await?))
}

#[get("/hot")]
async fn get_hot_channels(service: &State<ChannelService>) -> ApiResult<Vec<Channel>> {
    info!("Fetching channels commented today");
    Ok(Json(service.search_latest_by_comments_channel().await?))
}

#[post("/<channel_id>/comment", data = "<comment>")]
async fn add_comment(
    service: &State<ChannelService>,
    channel_id: &str,
    comment: Json<NewComment>,
) -> ApiResult<Channel> {
    debug!("Adding comment {:?} to channel {channel_id}", comment.0);
    Ok(Json(service.add_comment(channel_id, comment.into_inner()).await?))
}

#[get("/<channel_id>/hotcomments", rank = 2)]
async fn hot_comments(service: &State<ChannelService>, channel_id: &str) -> ApiResult<Vec<Comment>> {
    debug!("Fetching hot comments of channel {channel_id}");
    Ok(Json(service.hot_comments(channel_id).await?))
}
