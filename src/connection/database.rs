use crate::error::Error;
use crate::error::Result;

/// Settings shared by a database and every connection opened from it
#[derive(Debug, Clone)]
pub(crate) struct DatabaseOptions {
    pub(crate) path:        String,
    pub(crate) enable_mvcc: bool,
}

/// Opens a local Turso database
///
/// ```ignore
/// let db = Builder::new_local(":memory:").with_mvcc(false).build().await?;
/// let conn = db.connect()?;
/// ```
#[derive(Debug, Clone)]
pub struct Builder {
    options: DatabaseOptions,
}

impl Builder {
    pub fn new_local(path: &str) -> Self {
        Self { options: DatabaseOptions { path: path.to_string(), enable_mvcc: false } }
    }

    pub fn with_mvcc(mut self, mvcc: bool) -> Self {
        self.options.enable_mvcc = mvcc;
        self
    }

    pub async fn build(self) -> Result<Database> {
        let DatabaseOptions { path, enable_mvcc } = &self.options;
        if path.is_empty() {
            return Err(Error::InvalidArgument("database path must not be empty".to_string()));
        }

        tracing::debug!(%path, mvcc = enable_mvcc, "opening database");
        let db = turso::Builder::new_local(path).with_mvcc(*enable_mvcc).build().await?;

        Ok(Database { db, options: self.options })
    }
}

/// An opened database; hands out [`Connection`](super::Connection)s
#[derive(Debug, Clone)]
pub struct Database {
    db:      turso::Database,
    options: DatabaseOptions,
}

impl Database {
    pub fn path(&self) -> &str {
        &self.options.path
    }

    pub fn connect(&self) -> Result<super::Connection> {
        let conn = self.db.connect()?;
        tracing::trace!(path = %self.options.path, "connected");
        Ok(super::Connection::new(conn, self.options.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_path_rejected() {
        let err = Builder::new_local("").build().await.unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_connections_share_options() {
        let db = Builder::new_local(":memory:").build().await.unwrap();
        assert_eq!(db.path(), ":memory:");

        let conn = db.connect().unwrap();
        assert_eq!(conn.path(), ":memory:");
        assert!(!conn.is_mvcc_enabled());
    }
}
