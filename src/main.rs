#![deny(unsafe_code, unsafe_op_in_unsafe_fn, unstable_features, unstable_name_collisions)]
#![deny(deprecated, deprecated_in_future)]

#[rocket::main]
async fn main() -> Result<(), rocket::Error> {
    // launch api
    let _rocket = channel_api::rocket().launch().await?;

    Ok(())
}
