//! Basic SDK Example
//!
//! Logs in, publishes a blog post, uploads an image and reads back the
//! public view.
//!
//! # Usage
//!
//! 1. Start the server with a bootstrap admin:
//!    ```bash
//!    FOLIO_BOOTSTRAP__ADMIN_EMAIL=admin@example.com \
//!    FOLIO_BOOTSTRAP__ADMIN_PASSWORD=correct-horse-battery \
//!    cargo run --package folio-daemon
//!    ```
//!
//! 2. Run this example:
//!    ```bash
//!    cargo run --package folio-sdk --example basic
//!    ```

use folio_sdk::{ContentField, ContentInput, ContentQuery, FolioClient, MediaQuery};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Folio SDK - Basic Example");
    println!("=========================\n");

    let client = FolioClient::connect("http://127.0.0.1:8080").await?;

    println!("1. Logging in...");
    let login = client
        .login("admin@example.com", "correct-horse-battery")
        .await?;
    println!("   ✓ {} ({})\n", login.user.email, login.user.role);

    println!("2. Creating a published post...");
    let post = client
        .create_content(
            "blogs",
            &ContentInput {
                title: "Hello from the SDK".to_string(),
                fields: vec![
                    ContentField::text("content", "<p>Written with folio-sdk.</p>"),
                    ContentField::text("category", "news"),
                ],
                status: Some("published".to_string()),
                ..Default::default()
            },
        )
        .await?;
    println!("   ✓ {} -> /{}\n", post.id, post.slug);

    println!("3. Uploading an image...");
    // 1x1 transparent GIF
    let gif = vec![
        0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x01, 0x00, 0x01, 0x00, 0x80, 0x00, 0x00, 0x00, 0x00,
        0x00, 0xff, 0xff, 0xff, 0x21, 0xf9, 0x04, 0x01, 0x00, 0x00, 0x00, 0x00, 0x2c, 0x00, 0x00,
        0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x02, 0x02, 0x44, 0x01, 0x00, 0x3b,
    ];
    let media = client.upload_media("pixel.gif", "image/gif", gif).await?;
    println!(
        "   ✓ {} ({}x{})\n",
        media.url,
        media.width.unwrap_or(0),
        media.height.unwrap_or(0)
    );

    println!("4. Reading the public listing...");
    let page = client.public_content("blogs", &ContentQuery::default()).await?;
    for item in &page.items {
        println!("   - {} [{}]", item.title, item.status);
    }
    println!("   total: {}\n", page.pagination.total);

    let library = client.list_media(&MediaQuery::default()).await?;
    println!("5. Media library holds {} file(s)", library.pagination.total);

    client.logout().await?;
    println!("\n✓ Example completed successfully!");

    Ok(())
}
