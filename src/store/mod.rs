//! Where finished and unfinished games are kept between runs.
//!
//! The engine never talks to a store itself; callers hand it
//! [`GameRecord`]s from [`crate::GameSession::record`].

use chrono::Utc;

use crate::record::GameRecord;

mod memory;
pub use memory::{Memory, MemoryError};

mod mongodb;
pub use self::mongodb::MongoDb;

pub trait GameStoreAsync {
    type Id: Clone + std::fmt::Debug + Send + Sync;
    type Error: std::error::Error + Send + Sync + 'static;

    async fn save(&mut self, record: &GameRecord) -> Result<Self::Id, Self::Error>;

    async fn update(&mut self, id: &Self::Id, record: &GameRecord) -> Result<(), Self::Error>;

    /// The most recently saved game.
    async fn latest(&self) -> Result<Option<(Self::Id, GameRecord)>, Self::Error>;

    /// Every game, oldest first.
    async fn all(&self) -> Result<Vec<(Self::Id, GameRecord)>, Self::Error>;

    async fn clear(&mut self) -> Result<(), Self::Error>;

    /// The latest game, if it was left unfinished.
    async fn unfinished(&self) -> Result<Option<(Self::Id, GameRecord)>, Self::Error> {
        Ok(self
            .latest()
            .await?
            .filter(|(_, record)| record.in_progress()))
    }

    /// Marks the latest game as abandoned if it was left unfinished.
    async fn abandon_unfinished(&mut self) -> Result<bool, Self::Error> {
        if let Some((id, record)) = self.unfinished().await? {
            self.update(&id, &record.into_abandoned(Utc::now())).await?;

            tracing::debug!(?id, "marked game as abandoned");

            Ok(true)
        } else {
            Ok(false)
        }
    }
}
