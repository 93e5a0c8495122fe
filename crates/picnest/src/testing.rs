//! Test harness with an in-memory database, blob store and mailbox.
use crate::{context::AppContext, mailer::MemoryMailer};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use picnest_auth::JwtHmacKey;
use picnest_model::{PublicationDetail, PublicationInput, SignupInput, User};
use picnest_orm::{ConnectionPool, migrate};
use picnest_storage::{BlobStore, OpendalStore};
use std::{io::Cursor, path::Path, sync::Arc};
use toml::{Table, Value};

/// Builds a context with in-memory collaborators.
pub(crate) async fn context() -> (Arc<AppContext>, MemoryMailer) {
    let blob_store = OpendalStore::memory("http://localhost:6080/blobs").unwrap();
    context_with_blob_store(Arc::new(blob_store)).await
}

/// Builds a context with an in-memory database and the blob store.
pub(crate) async fn context_with_blob_store(
    blob_store: Arc<dyn BlobStore>,
) -> (Arc<AppContext>, MemoryMailer) {
    let pool = ConnectionPool::connect_memory().await.unwrap();
    migrate(&pool).await.unwrap();
    let jwt_key = JwtHmacKey::new(b"picnest-test-secret-key");
    let mailer = MemoryMailer::default();
    let ctx = AppContext::new(pool, blob_store, jwt_key, Arc::new(mailer.clone()));
    (Arc::new(ctx), mailer)
}

/// Builds a context backed by a SQLite file in the directory.
pub(crate) async fn file_context(dir: &Path) -> Arc<AppContext> {
    let database = dir.join("picnest.db");
    let mut config = Table::new();
    config.insert(
        "database".to_owned(),
        Value::String(database.display().to_string()),
    );
    config.insert("max-connections".to_owned(), Value::Integer(8));
    let pool = ConnectionPool::with_config(&config).unwrap();
    migrate(&pool).await.unwrap();
    let blob_store = OpendalStore::memory("http://localhost:6080/blobs").unwrap();
    let jwt_key = JwtHmacKey::new(b"picnest-test-secret-key");
    let mailer = MemoryMailer::default();
    let ctx = AppContext::new(pool, Arc::new(blob_store), jwt_key, Arc::new(mailer));
    Arc::new(ctx)
}

/// Signs up a user with the name and confirms the email.
pub(crate) async fn sign_up(ctx: &AppContext, name: &str) -> User {
    let input = SignupInput {
        username: name.to_owned(),
        email: format!("{name}@x.com"),
        password: "secret1".to_owned(),
        about: None,
    };
    let user = ctx.auth().signup(input).await.unwrap();
    let mut conn = ctx.pool().acquire().await.unwrap();
    User::confirm_email(&mut conn, user.email())
        .await
        .unwrap()
        .unwrap()
}

/// Uploads an image and publishes it with the title and tags.
pub(crate) async fn publish(
    ctx: &AppContext,
    owner: &User,
    title: &str,
    tags: &[&str],
) -> PublicationDetail {
    ctx.images().upload_temp(owner, png_bytes(16, 12)).await.unwrap();
    let input = PublicationInput {
        title: Some(title.to_owned()),
        description: Some("A quiet morning".to_owned()),
        tags: tags.iter().map(|&tag| tag.to_owned()).collect(),
    };
    ctx.publications().create(owner, input).await.unwrap()
}

/// Encodes a PNG image.
pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| Rgb([(x * 8) as u8, (y * 8) as u8, 96]));
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}
