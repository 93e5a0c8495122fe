//! Shared collaborators of the services.
use crate::{
    mailer::{self, MailTemplate, Mailer},
    service::{
        AuthService, CommentService, ImageService, ProfileService, PublicationService,
        RatingService, TagService,
    },
};
use picnest_auth::JwtHmacKey;
use picnest_core::{error::Error, extension::TomlTableExt, state::State};
use picnest_orm::{ConnectionPool, migrate};
use picnest_storage::{BlobStore, OpendalStore, QrCodeGenerator};
use std::sync::Arc;

/// Application context built once at startup.
pub(crate) struct AppContext {
    /// Database pool.
    pool: ConnectionPool,
    /// Blob store.
    blob_store: Arc<dyn BlobStore>,
    /// Token key.
    jwt_key: JwtHmacKey,
    /// QR code generator.
    qr_generator: QrCodeGenerator,
    /// Mailer.
    mailer: Arc<dyn Mailer>,
    /// Email templates.
    mail_template: MailTemplate,
}

impl AppContext {
    /// Creates a new instance.
    pub(crate) fn new(
        pool: ConnectionPool,
        blob_store: Arc<dyn BlobStore>,
        jwt_key: JwtHmacKey,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            pool,
            blob_store,
            jwt_key,
            qr_generator: QrCodeGenerator::default(),
            mailer,
            mail_template: MailTemplate::with_config(None),
        }
    }

    /// Builds the context from the config and migrates the database schema.
    pub(crate) async fn with_state(state: &State) -> Result<Self, Error> {
        let database_config = state
            .get_config("database")
            .ok_or_else(|| Error::new("the `[database]` config should be specified"))?;
        let pool = ConnectionPool::with_config(database_config)?;
        migrate(&pool).await?;

        let blob_store = match state.get_config("storage") {
            Some(config) => OpendalStore::with_config(config)?,
            None => OpendalStore::with_config(&toml::Table::new())?,
        };
        let jwt_key = state
            .get_config("jwt")
            .ok_or_else(|| Error::new("the `[jwt]` config should be specified"))
            .and_then(JwtHmacKey::with_config)?;
        let mail_config = state.get_config("mail");
        let mailer = mailer::with_config(mail_config)?;

        let mut ctx = Self::new(pool, Arc::new(blob_store), jwt_key, mailer);
        if let Some(config) = state.get_config("qrcode") {
            let box_size = config.get_u32("box-size").unwrap_or(10);
            let border = config.get_u32("border").unwrap_or(4);
            ctx.qr_generator = QrCodeGenerator::new(box_size, border);
        }
        ctx.mail_template = MailTemplate::with_config(mail_config);
        Ok(ctx)
    }

    /// Returns a reference to the database pool.
    #[inline]
    pub(crate) fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    /// Returns a reference to the blob store.
    #[inline]
    pub(crate) fn blob_store(&self) -> &dyn BlobStore {
        self.blob_store.as_ref()
    }

    /// Returns a reference to the token key.
    #[inline]
    pub(crate) fn jwt_key(&self) -> &JwtHmacKey {
        &self.jwt_key
    }

    /// Returns a reference to the QR code generator.
    #[inline]
    pub(crate) fn qr_generator(&self) -> &QrCodeGenerator {
        &self.qr_generator
    }

    /// Returns a reference to the mailer.
    #[inline]
    pub(crate) fn mailer(&self) -> &dyn Mailer {
        self.mailer.as_ref()
    }

    /// Returns a reference to the email templates.
    #[inline]
    pub(crate) fn mail_template(&self) -> &MailTemplate {
        &self.mail_template
    }

    /// Account service.
    #[inline]
    pub(crate) fn auth(&self) -> AuthService<'_> {
        AuthService::new(self)
    }

    /// Profile service.
    #[inline]
    pub(crate) fn profiles(&self) -> ProfileService<'_> {
        ProfileService::new(self)
    }

    /// Temporary image service.
    #[inline]
    pub(crate) fn images(&self) -> ImageService<'_> {
        ImageService::new(self)
    }

    /// Publication service.
    #[inline]
    pub(crate) fn publications(&self) -> PublicationService<'_> {
        PublicationService::new(self)
    }

    /// Tag service.
    #[inline]
    pub(crate) fn tags(&self) -> TagService<'_> {
        TagService::new(self)
    }

    /// Rating service.
    #[inline]
    pub(crate) fn ratings(&self) -> RatingService<'_> {
        RatingService::new(self)
    }

    /// Comment service.
    #[inline]
    pub(crate) fn comments(&self) -> CommentService<'_> {
        CommentService::new(self)
    }
}
