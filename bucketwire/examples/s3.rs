use anyhow::Result;
use bucketwire::s3::{Config, ListOptions, PutOptions};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    // Endpoint and keys come from BUCKETWIRE_* or AWS_* variables.
    let client = bucketwire::default_client(Config::default())?;

    if !client.bucket_exists("bucketwire-demo").await? {
        client.create_bucket("bucketwire-demo").await?;
    }

    let out = client
        .put_object(
            "bucketwire-demo",
            "hello.txt",
            "Hello, World!",
            PutOptions::default(),
        )
        .await?;
    println!("uploaded hello.txt with etag {}", out.etag);

    let mut lister = client.list_all_objects("bucketwire-demo", ListOptions::default())?;
    while let Some(entry) = lister.next().await? {
        println!("{}\t{}", entry.size, entry.key);
    }

    let url = client
        .presign_get("bucketwire-demo", "hello.txt", Duration::from_secs(3600))
        .await?;
    println!("share for an hour: {url}");

    client.close().await?;
    Ok(())
}
