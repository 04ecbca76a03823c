use super::{Connection, Database, DbError, ReadOnlyCredentials};
use crate::config::DatabaseConfig;
use async_trait::async_trait;
use rustls::{ClientConfig, RootCertStore};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tokio_postgres::config::SslMode;
use tokio_postgres::tls::{MakeTlsConnect, TlsConnect};
use tokio_postgres::{Client, Config, NoTls, Socket};
use tokio_postgres_rustls::MakeRustlsConnect;

const APPLICATION_NAME: &str = "devstats-api";

/// Opens read-only Postgres connections using the shared credentials and a
/// per-request database name.
pub struct PgDatabase {
    credentials: ReadOnlyCredentials,
    tls: Option<MakeRustlsConnect>,
    connect_timeout: Duration,
    query_timeout: Duration,
}

impl PgDatabase {
    /// Fails only when TLS is requested and no root certificates can be loaded.
    pub fn new(
        credentials: ReadOnlyCredentials,
        config: &DatabaseConfig,
    ) -> Result<Self, DbError> {
        let tls = match credentials.ssl_mode {
            SslMode::Disable => None,
            _ => Some(build_tls_connector()?),
        };

        Ok(PgDatabase {
            credentials,
            tls,
            connect_timeout: config.connect_timeout(),
            query_timeout: config.query_timeout(),
        })
    }

    fn pg_config(&self, database: &str) -> Config {
        let mut config = Config::new();
        config
            .host(&self.credentials.host)
            .port(self.credentials.port)
            .user(&self.credentials.user)
            .password(self.credentials.password())
            .dbname(database)
            .ssl_mode(self.credentials.ssl_mode)
            .application_name(APPLICATION_NAME)
            // Even a misconfigured role cannot write through this service
            .options("-c default_transaction_read_only=on")
            .connect_timeout(self.connect_timeout);
        config
    }

    async fn open<T>(&self, config: &Config, database: &str, tls: T) -> Result<Client, DbError>
    where
        T: MakeTlsConnect<Socket> + Send + Sync + 'static,
        T::Stream: Send + Sync + 'static,
        T::TlsConnect: Send + Sync,
        <T::TlsConnect as TlsConnect<Socket>>::Future: Send,
    {
        let (client, connection) = timeout(self.connect_timeout, config.connect(tls))
            .await
            .map_err(|_| DbError::Timeout {
                stage: "connect",
                after: self.connect_timeout,
            })?
            .map_err(|e| DbError::Connect {
                database: database.to_string(),
                message: e.to_string(),
            })?;

        // The connection future resolves once the client is dropped.
        let db_name = database.to_string();
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::warn!(database = %db_name, error = %e, "Postgres connection error");
            }
        });

        Ok(client)
    }
}

fn build_tls_connector() -> Result<MakeRustlsConnect, DbError> {
    let native = rustls_native_certs::load_native_certs();
    for error in &native.errors {
        tracing::warn!(error = %error, "Could not load a native root certificate");
    }

    let mut roots = RootCertStore::empty();
    let (added, ignored) = roots.add_parsable_certificates(native.certs);
    tracing::debug!(added, ignored, "Loaded root certificates for Postgres TLS");
    if roots.is_empty() {
        return Err(DbError::Tls("no root certificates available".into()));
    }

    let tls_config = ClientConfig::builder_with_provider(Arc::new(
        rustls::crypto::ring::default_provider(),
    ))
    .with_safe_default_protocol_versions()
    .map_err(|e| DbError::Tls(e.to_string()))?
    .with_root_certificates(roots)
    .with_no_client_auth();

    Ok(MakeRustlsConnect::new(tls_config))
}

#[async_trait]
impl Database for PgDatabase {
    async fn connect(&self, database: &str) -> Result<Box<dyn Connection>, DbError> {
        let config = self.pg_config(database);

        let client = match &self.tls {
            Some(tls) => self.open(&config, database, tls.clone()).await?,
            None => self.open(&config, database, NoTls).await?,
        };

        Ok(Box::new(PgConnection {
            client,
            query_timeout: self.query_timeout,
        }))
    }
}

struct PgConnection {
    client: Client,
    query_timeout: Duration,
}

#[async_trait]
impl Connection for PgConnection {
    async fn query_i64(&mut self, sql: &str) -> Result<Vec<i64>, DbError> {
        tracing::debug!(sql, "Executing query");

        let rows = timeout(self.query_timeout, self.client.query(sql, &[]))
            .await
            .map_err(|_| DbError::Timeout {
                stage: "query",
                after: self.query_timeout,
            })?
            .map_err(|e| DbError::Query(e.to_string()))?;

        rows.iter()
            .map(|row| {
                row.try_get::<_, i64>(0)
                    .map_err(|e| DbError::Scan(e.to_string()))
            })
            .collect()
    }
}
