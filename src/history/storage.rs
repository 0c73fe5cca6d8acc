use super::ChatRecord;
use crate::{Error, Result};
use libsql::{Builder, Database};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

pub struct ChatStore {
    db: Option<Database>,
    // In-memory fallback storage
    fallback: Arc<Mutex<Vec<ChatRecord>>>,
}

impl ChatStore {
    pub async fn new(db_path: &str) -> Result<Self> {
        let mut store = Self {
            db: None,
            fallback: Arc::new(Mutex::new(Vec::new())),
        };

        // Try to initialize database
        match store.init_database(db_path).await {
            Ok(()) => {
                info!("Database initialized successfully: {}", db_path);
            }
            Err(e) => {
                warn!(
                    "Database initialization failed, using in-memory fallback: {}",
                    e
                );
            }
        }

        Ok(store)
    }

    async fn init_database(&mut self, db_path: &str) -> Result<()> {
        let db = Builder::new_local(db_path).build().await?;

        // Create table if it doesn't exist
        let conn = db.connect()?;
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS chats (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id TEXT NOT NULL,
                question TEXT NOT NULL,
                answer TEXT NOT NULL,
                response_time REAL NOT NULL,
                feedback TEXT,
                created_at DATETIME NOT NULL
            )
            "#,
            (),
        )
        .await?;

        self.db = Some(db);
        Ok(())
    }

    /// Persists one exchange and returns its record id.
    pub async fn save(&self, record: ChatRecord) -> Result<i64> {
        // Try database first
        if let Some(ref db) = self.db {
            match self.save_to_db(db, &record).await {
                Ok(id) => {
                    debug!("Chat record saved to database: {}", record.session_id);
                    return Ok(id);
                }
                Err(e) => {
                    warn!("Failed to save to database, using fallback: {}", e);
                }
            }
        }

        // Fallback to in-memory storage
        self.save_to_fallback(record)
    }

    async fn save_to_db(&self, db: &Database, record: &ChatRecord) -> Result<i64> {
        let conn = db.connect()?;
        conn.execute(
            "INSERT INTO chats (session_id, question, answer, response_time, feedback, created_at) VALUES (?, ?, ?, ?, ?, ?)",
            (
                record.session_id.as_str(),
                record.question.as_str(),
                record.answer.as_str(),
                record.response_time,
                record.feedback.clone(),
                record.created_at.to_rfc3339(),
            ),
        )
        .await?;
        Ok(conn.last_insert_rowid())
    }

    fn save_to_fallback(&self, mut record: ChatRecord) -> Result<i64> {
        let mut fallback = self
            .fallback
            .lock()
            .map_err(|e| Error::internal(format!("Mutex lock failed: {e}")))?;
        let id = fallback.len() as i64 + 1;
        record.id = Some(id);
        fallback.push(record);
        Ok(id)
    }

    pub async fn list(&self, session_id: &str) -> Result<Vec<ChatRecord>> {
        // Try database first
        if let Some(ref db) = self.db {
            match self.list_from_db(db, session_id).await {
                Ok(records) => {
                    debug!(
                        "Retrieved {} chat records from database for session: {}",
                        records.len(),
                        session_id
                    );
                    return Ok(records);
                }
                Err(e) => {
                    warn!("Failed to read from database, using fallback: {}", e);
                }
            }
        }

        // Fallback to in-memory storage
        self.list_from_fallback(session_id)
    }

    async fn list_from_db(&self, db: &Database, session_id: &str) -> Result<Vec<ChatRecord>> {
        let conn = db.connect()?;
        let mut rows = conn.query(
            "SELECT id, session_id, question, answer, response_time, feedback, created_at FROM chats WHERE session_id = ? ORDER BY id ASC",
            [session_id]
        ).await?;

        let mut records = Vec::new();
        while let Some(row) = rows.next().await? {
            let created_at_str: String = row.get(6)?;
            let created_at = chrono::DateTime::parse_from_rfc3339(&created_at_str)
                .map_err(|e| Error::internal(format!("Failed to parse timestamp: {e}")))?
                .with_timezone(&chrono::Utc);

            let record = ChatRecord {
                id: Some(row.get(0)?),
                session_id: row.get(1)?,
                question: row.get(2)?,
                answer: row.get(3)?,
                response_time: row.get(4)?,
                feedback: row.get(5)?,
                created_at,
            };
            records.push(record);
        }

        Ok(records)
    }

    fn list_from_fallback(&self, session_id: &str) -> Result<Vec<ChatRecord>> {
        let fallback = self
            .fallback
            .lock()
            .map_err(|e| Error::internal(format!("Mutex lock failed: {e}")))?;

        let records: Vec<ChatRecord> = fallback
            .iter()
            .filter(|rec| rec.session_id == session_id)
            .cloned()
            .collect();

        debug!(
            "Retrieved {} chat records from fallback for session: {}",
            records.len(),
            session_id
        );
        Ok(records)
    }

    /// Attaches user feedback to an existing record. Unknown ids are an
    /// error so the caller can answer 404.
    pub async fn set_feedback(&self, chat_id: i64, feedback: &str) -> Result<()> {
        if let Some(ref db) = self.db {
            match self.set_feedback_in_db(db, chat_id, feedback).await {
                Ok(()) => {
                    debug!("Feedback saved for chat record: {}", chat_id);
                    return Ok(());
                }
                Err(Error::ChatNotFound { chat_id }) => {
                    return Err(Error::ChatNotFound { chat_id });
                }
                Err(e) => {
                    warn!("Failed to update database, using fallback: {}", e);
                }
            }
        }

        self.set_feedback_in_fallback(chat_id, feedback)
    }

    async fn set_feedback_in_db(&self, db: &Database, chat_id: i64, feedback: &str) -> Result<()> {
        let conn = db.connect()?;
        let updated = conn
            .execute(
                "UPDATE chats SET feedback = ? WHERE id = ?",
                (feedback, chat_id),
            )
            .await?;

        if updated == 0 {
            return Err(Error::ChatNotFound { chat_id });
        }
        Ok(())
    }

    fn set_feedback_in_fallback(&self, chat_id: i64, feedback: &str) -> Result<()> {
        let mut fallback = self
            .fallback
            .lock()
            .map_err(|e| Error::internal(format!("Mutex lock failed: {e}")))?;

        match fallback.iter_mut().find(|rec| rec.id == Some(chat_id)) {
            Some(record) => {
                record.feedback = Some(feedback.to_string());
                Ok(())
            }
            None => Err(Error::ChatNotFound { chat_id }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_in_memory_storage() {
        let store = ChatStore::new(":memory:").await.unwrap();
        assert!(store.db.is_some());

        let session_id = "test-session";
        let record = ChatRecord::new(
            session_id.to_string(),
            "Hello".to_string(),
            "Hi there!".to_string(),
            1.25,
        );

        let id = store.save(record).await.unwrap();
        assert!(id > 0);

        let records = store.list(session_id).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].question, "Hello");
        assert_eq!(records[0].answer, "Hi there!");
        assert_eq!(records[0].response_time, 1.25);
        assert_eq!(records[0].feedback, None);
    }

    #[tokio::test]
    async fn test_file_database_storage() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let db_path_str = db_path.to_string_lossy().to_string();

        let store = ChatStore::new(&db_path_str).await.unwrap();
        assert!(store.db.is_some());

        let session_id = "file-test-session";
        for i in 0..3 {
            let record = ChatRecord::new(
                session_id.to_string(),
                format!("Question {i}"),
                format!("Answer {i}"),
                0.5,
            );
            store.save(record).await.unwrap();
        }

        let records = store.list(session_id).await.unwrap();
        assert_eq!(records.len(), 3);
        for (i, record) in records.iter().enumerate() {
            assert_eq!(record.question, format!("Question {i}"));
            assert_eq!(record.answer, format!("Answer {i}"));
            assert!(record.id.is_some());
        }
    }

    #[tokio::test]
    async fn test_fallback_storage_when_db_fails() {
        // Use an invalid path to force database initialization failure
        let store = ChatStore::new("/invalid/path/to/database.db").await.unwrap();
        assert!(store.db.is_none());

        let session_id = "fallback-test";
        let record = ChatRecord::new(
            session_id.to_string(),
            "Test question".to_string(),
            "Test answer".to_string(),
            0.0,
        );

        let id = store.save(record).await.unwrap();
        let records = store.list(session_id).await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, Some(id));
        assert_eq!(records[0].question, "Test question");
    }

    #[tokio::test]
    async fn test_multiple_sessions() {
        let store = ChatStore::new(":memory:").await.unwrap();

        let session1 = "session-1";
        let session2 = "session-2";

        store
            .save(ChatRecord::new(
                session1.to_string(),
                "S1 Q1".to_string(),
                "S1 A1".to_string(),
                0.1,
            ))
            .await
            .unwrap();
        store
            .save(ChatRecord::new(
                session2.to_string(),
                "S2 Q1".to_string(),
                "S2 A1".to_string(),
                0.2,
            ))
            .await
            .unwrap();
        store
            .save(ChatRecord::new(
                session1.to_string(),
                "S1 Q2".to_string(),
                "S1 A2".to_string(),
                0.3,
            ))
            .await
            .unwrap();

        let session1_records = store.list(session1).await.unwrap();
        let session2_records = store.list(session2).await.unwrap();

        assert_eq!(session1_records.len(), 2);
        assert_eq!(session2_records.len(), 1);
        assert_eq!(session1_records[0].question, "S1 Q1");
        assert_eq!(session1_records[1].question, "S1 Q2");
        assert_eq!(session2_records[0].question, "S2 Q1");
    }

    #[tokio::test]
    async fn test_empty_session() {
        let store = ChatStore::new(":memory:").await.unwrap();

        let records = store.list("nonexistent-session").await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_set_feedback() {
        let store = ChatStore::new(":memory:").await.unwrap();

        let id = store
            .save(ChatRecord::new(
                "feedback-session".to_string(),
                "Was this useful?".to_string(),
                "Very".to_string(),
                0.4,
            ))
            .await
            .unwrap();

        store.set_feedback(id, "helpful").await.unwrap();

        let records = store.list("feedback-session").await.unwrap();
        assert_eq!(records[0].feedback, Some("helpful".to_string()));
    }

    #[tokio::test]
    async fn test_set_feedback_unknown_id() {
        let store = ChatStore::new(":memory:").await.unwrap();

        let result = store.set_feedback(9999, "helpful").await;
        assert!(matches!(result, Err(Error::ChatNotFound { chat_id: 9999 })));
    }

    #[tokio::test]
    async fn test_set_feedback_in_fallback() {
        let store = ChatStore::new("/invalid/path").await.unwrap();

        let id = store
            .save(ChatRecord::new(
                "fb".to_string(),
                "Q".to_string(),
                "A".to_string(),
                0.0,
            ))
            .await
            .unwrap();

        store.set_feedback(id, "unhelpful").await.unwrap();
        let records = store.list("fb").await.unwrap();
        assert_eq!(records[0].feedback, Some("unhelpful".to_string()));

        let missing = store.set_feedback(id + 100, "helpful").await;
        assert!(matches!(missing, Err(Error::ChatNotFound { .. })));
    }

    #[tokio::test]
    async fn test_concurrent_access() {
        let store = Arc::new(ChatStore::new(":memory:").await.unwrap());
        let session_id = "concurrent-test";

        let mut handles = vec![];

        for i in 0..10 {
            let store_clone = Arc::clone(&store);
            let session_id = session_id.to_string();
            let handle = tokio::spawn(async move {
                let record = ChatRecord::new(
                    session_id,
                    format!("Question {}", i),
                    format!("Answer {}", i),
                    0.0,
                );
                store_clone.save(record).await
            });
            handles.push(handle);
        }

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let records = store.list(session_id).await.unwrap();
        assert_eq!(records.len(), 10);
    }

    #[tokio::test]
    async fn test_large_content() {
        let store = ChatStore::new(":memory:").await.unwrap();
        let session_id = "large-content-test";

        let large_answer = "x".repeat(10000);
        let record = ChatRecord::new(
            session_id.to_string(),
            "Say x a lot".to_string(),
            large_answer.clone(),
            2.0,
        );

        store.save(record).await.unwrap();
        let records = store.list(session_id).await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].answer, large_answer);
    }
}
