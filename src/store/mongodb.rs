use mongodb::{
    bson::{self, doc, oid::ObjectId, DateTime},
    options::{FindOneOptions, FindOptions},
};
use serde::{Deserialize, Serialize};

use crate::record::GameRecord;

#[derive(Debug, Clone)]
pub struct MongoDb {
    games: mongodb::Collection<GameDocument>,
}

impl MongoDb {
    const GAMES_COLLECTION_NAME: &'static str = "mastermind_games";

    pub fn from_database(db: &mongodb::Database) -> Self {
        Self {
            games: db.collection(Self::GAMES_COLLECTION_NAME),
        }
    }

    /// Connects to `url` and uses the `database` inside it.
    pub async fn connect(url: &str, database: &str) -> Result<Self, Error> {
        let options = mongodb::options::ClientOptions::parse(url).await?;
        let client = mongodb::Client::with_options(options)?;

        Ok(Self::from_database(&client.database(database)))
    }
}

impl<'a> From<&'a mongodb::Database> for MongoDb {
    fn from(value: &'a mongodb::Database) -> Self {
        Self::from_database(value)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct GameDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    added: DateTime,
    record: GameRecord,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("mongodb error: {0}")]
    MongoDb(#[from] mongodb::error::Error),

    #[error("couldn't serialize game: {0}")]
    Serialize(#[from] bson::ser::Error),
}

impl super::GameStoreAsync for MongoDb {
    type Id = ObjectId;
    type Error = Error;

    async fn save(&mut self, record: &GameRecord) -> Result<Self::Id, Self::Error> {
        let document = GameDocument {
            id: ObjectId::new(),
            added: DateTime::now(),
            record: record.clone(),
        };

        self.games.insert_one(&document, None).await?;

        Ok(document.id)
    }

    async fn update(&mut self, id: &Self::Id, record: &GameRecord) -> Result<(), Self::Error> {
        self.games
            .update_one(
                doc! { "_id": *id },
                doc! { "$set": { "record": bson::to_bson(record)? } },
                None,
            )
            .await?;

        Ok(())
    }

    async fn latest(&self) -> Result<Option<(Self::Id, GameRecord)>, Self::Error> {
        Ok(self
            .games
            .find_one(
                None,
                FindOneOptions::builder()
                    .sort(doc! {
                        "added": -1,
                        "_id": -1,
                    })
                    .build(),
            )
            .await?
            .map(|document| (document.id, document.record)))
    }

    async fn all(&self) -> Result<Vec<(Self::Id, GameRecord)>, Self::Error> {
        let mut cursor = self
            .games
            .find(
                None,
                FindOptions::builder()
                    .sort(doc! {
                        "added": 1,
                        "_id": 1,
                    })
                    .build(),
            )
            .await?;

        let mut games = Vec::new();
        while cursor.advance().await? {
            let document = cursor.deserialize_current()?;
            games.push((document.id, document.record));
        }

        Ok(games)
    }

    async fn clear(&mut self) -> Result<(), Self::Error> {
        self.games.delete_many(doc! {}, None).await?;
        Ok(())
    }
}
