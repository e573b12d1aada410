use crate::record::GameRecord;

/// Keeps games for as long as the process lives.
#[derive(Debug, Clone, Default)]
pub struct Memory {
    games: Vec<GameRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MemoryError {
    #[error("no game with id {0}")]
    NotFound(usize),
}

impl super::GameStoreAsync for Memory {
    type Id = usize;
    type Error = MemoryError;

    async fn save(&mut self, record: &GameRecord) -> Result<Self::Id, Self::Error> {
        self.games.push(record.clone());
        Ok(self.games.len() - 1)
    }

    async fn update(&mut self, id: &Self::Id, record: &GameRecord) -> Result<(), Self::Error> {
        let slot = self.games.get_mut(*id).ok_or(MemoryError::NotFound(*id))?;
        *slot = record.clone();
        Ok(())
    }

    async fn latest(&self) -> Result<Option<(Self::Id, GameRecord)>, Self::Error> {
        Ok(self
            .games
            .last()
            .map(|record| (self.games.len() - 1, record.clone())))
    }

    async fn all(&self) -> Result<Vec<(Self::Id, GameRecord)>, Self::Error> {
        Ok(self.games.iter().cloned().enumerate().collect())
    }

    async fn clear(&mut self) -> Result<(), Self::Error> {
        self.games.clear();
        Ok(())
    }
}
