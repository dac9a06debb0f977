//! Folio SDK - Rust Client Library
//!
//! Typed client for the Folio CMS HTTP API. The client keeps the session
//! tokens and transparently refreshes them once when an access token expires.
//!
//! # Example
//!
//! ```no_run
//! use folio_sdk::{ContentField, ContentInput, FolioClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = FolioClient::connect("http://127.0.0.1:8080").await?;
//!     client.login("admin@example.com", "correct-horse-battery").await?;
//!
//!     let post = client
//!         .create_content(
//!             "blogs",
//!             &ContentInput {
//!                 title: "Hello World".to_string(),
//!                 fields: vec![ContentField::text("content", "<p>Hi</p>")],
//!                 ..Default::default()
//!             },
//!         )
//!         .await?;
//!
//!     println!("Created {}", post.slug);
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod types;

pub use client::FolioClient;
pub use error::{Result, SdkError};
pub use types::{
    ActivityLog, Content, ContentField, ContentInput, ContentPatch, ContentQuery, LogQuery,
    LoginResult, Media, MediaQuery, Page, Pagination, RegisterRequest, Session, Setting,
    SettingInput, SettingsMap, SiteStatistics, SiteStatus, UserProfile, UserRef, UserSummary,
};
