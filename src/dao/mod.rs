/// Database model definitions.
pub mod models;
/// Question bank access for game sessions.
pub mod question_store;
/// Round result persistence and change notification.
pub mod result_store;
/// Storage abstraction layer for database operations.
pub mod storage;
