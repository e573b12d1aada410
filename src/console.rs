use std::{error::Error as StdError, str::FromStr};

use thisslime::TracingError;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Lines};
use tracing::{debug, info, warn};

use mastermind::{
    random::{BoxError, RandomSource, Remote, RemoteError},
    store::GameStoreAsync,
    Code, Error, GameConfig, GameRecord, GameSession, Status,
};

#[derive(Debug, thiserror::Error, TracingError)]
pub enum ConsoleError {
    #[error("terminal error: {0}")]
    #[event(level = ERROR)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Game(#[from] Error),

    #[error("couldn't reach the game store: {0}")]
    #[event(level = ERROR)]
    Store(BoxError),

    #[error("couldn't check the random.org quota: {0}")]
    Quota(#[from] RemoteError),
}

impl ConsoleError {
    fn store<E: StdError + Send + Sync + 'static>(err: E) -> Self {
        Self::Store(Box::new(err))
    }
}

/// How a call to [`Console::play`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Won,
    Lost,
    /// Input ran out. An unfinished game stays stored as in progress.
    Paused,
}

/// What the player chose to do about a game left unfinished last time.
enum Resume<Id> {
    Game(Id, GameSession),
    NewGame,
    InputClosed,
}

/// `1 guess`, `2 guesses`.
fn plural(count: usize, one: &str, many: &str) -> String {
    format!("{count} {}", if count == 1 { one } else { many })
}

fn is_yes(answer: &str) -> bool {
    answer.trim().to_lowercase().starts_with('y')
}

pub struct Console<R, W, S> {
    lines: Lines<R>,
    out: W,
    store: S,
}

impl<S: GameStoreAsync> Console<BufReader<tokio::io::Stdin>, tokio::io::Stdout, S> {
    pub fn stdio(store: S) -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout(), store)
    }
}

impl<R, W, S> Console<R, W, S>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    S: GameStoreAsync,
{
    pub fn new(input: R, out: W, store: S) -> Self {
        Self {
            lines: input.lines(),
            out,
            store,
        }
    }

    #[cfg(test)]
    fn into_parts(self) -> (W, S) {
        (self.out, self.store)
    }

    async fn say(&mut self, text: impl AsRef<str>) -> Result<(), ConsoleError> {
        self.out.write_all(text.as_ref().as_bytes()).await?;
        self.out.write_all(b"\n").await?;
        self.out.flush().await?;
        Ok(())
    }

    async fn ask(&mut self, prompt: impl AsRef<str>) -> Result<Option<String>, ConsoleError> {
        self.out.write_all(prompt.as_ref().as_bytes()).await?;
        self.out.flush().await?;
        Ok(self.lines.next_line().await?)
    }

    /// Offers to pick up the last unfinished game. Declining marks it abandoned.
    async fn resume_or_abandon(&mut self) -> Result<Resume<S::Id>, ConsoleError> {
        let (id, record) = match self.store.unfinished().await {
            Ok(Some(found)) => found,
            Ok(None) => return Ok(Resume::NewGame),
            Err(err) => {
                warn!(error = %err, "couldn't look up unfinished games");
                return Ok(Resume::NewGame);
            }
        };

        let question = format!(
            "You have an unfinished game from {} with {} left. Resume it? [y/n] ",
            record.started_at.format("%Y-%m-%d %H:%M"),
            plural(record.attempts_remaining(), "guess", "guesses")
        );

        let Some(answer) = self.ask(question).await? else {
            return Ok(Resume::InputClosed);
        };

        if is_yes(&answer) {
            match GameSession::resume(&record) {
                Ok(session) => return Ok(Resume::Game(id, session)),
                Err(err) => {
                    err.trace();
                    self.say("That game can't be resumed, starting a new one.")
                        .await?;
                }
            }
        }

        if let Err(err) = self.store.abandon_unfinished().await {
            warn!(error = %err, "couldn't mark game as abandoned");
        }

        Ok(Resume::NewGame)
    }

    async fn save(&mut self, record: &GameRecord) -> Option<S::Id> {
        match self.store.save(record).await {
            Ok(id) => Some(id),
            Err(err) => {
                warn!(error = %err, "couldn't save new game, it won't be resumable");
                None
            }
        }
    }

    async fn update(&mut self, id: Option<&S::Id>, record: &GameRecord) {
        if let Some(id) = id {
            if let Err(err) = self.store.update(id, record).await {
                warn!(error = %err, "couldn't update stored game");
            }
        }
    }

    /// Runs one game to the end, or until input runs out.
    #[tracing::instrument(skip_all)]
    pub async fn play<Rs>(&mut self, config: GameConfig, source: &Rs) -> Result<Outcome, ConsoleError>
    where
        Rs: RandomSource,
    {
        let (id, mut game) = match self.resume_or_abandon().await? {
            Resume::Game(id, game) => (Some(id), game),
            Resume::NewGame => {
                let game = GameSession::start(config, source).await?;
                (self.save(&game.record()).await, game)
            }
            Resume::InputClosed => {
                self.say("").await?;
                info!("input closed before the game started");
                return Ok(Outcome::Paused);
            }
        };

        let config = *game.config();
        self.say(format!(
            "Guess {} numbers, each from 0 to {}. You have {}.",
            config.code_length,
            config.max_symbol(),
            plural(game.attempts_remaining(), "guess", "guesses")
        ))
        .await?;

        let previous: Vec<_> = game.attempts().to_vec();
        for attempt in &previous {
            self.say(format!(
                "  #{} {}  {}",
                attempt.number(),
                attempt.guess(),
                attempt.feedback().pegs(config.code_length)
            ))
            .await?;
        }

        while game.in_progress() {
            let prompt = format!(
                "Guess {}/{}: ",
                game.attempts().len() + 1,
                config.max_attempts
            );

            let Some(line) = self.ask(prompt).await? else {
                self.say("\nGame saved. Play again to pick it back up.")
                    .await?;
                info!("input closed mid-game");
                return Ok(Outcome::Paused);
            };

            if line.trim().is_empty() {
                continue;
            }

            let feedback = match Code::from_str(&line)
                .map_err(Error::from)
                .and_then(|guess| game.submit_guess(guess))
            {
                Ok(feedback) => feedback,
                Err(err) if err.is_user_error() => {
                    err.trace();
                    self.say(format!("  {err}")).await?;
                    continue;
                }
                Err(err) => return Err(err.into()),
            };

            self.say(format!(
                "  {}  {feedback}",
                feedback.pegs(config.code_length)
            ))
            .await?;

            self.update(id.as_ref(), &game.record()).await;
        }

        let secret = game.reveal_secret()?.clone();

        let outcome = match game.status() {
            Status::Won => {
                self.say(format!(
                    "You cracked it in {}!",
                    plural(game.attempts().len(), "guess", "guesses")
                ))
                .await?;
                Outcome::Won
            }
            _ => {
                self.say(format!("Out of guesses. The secret was {secret}."))
                    .await?;
                Outcome::Lost
            }
        };

        debug!(?outcome, "game finished");

        Ok(outcome)
    }

    /// Plays games back to back until the player declines another or input runs out.
    pub async fn play_rounds<Rs>(
        &mut self,
        config: GameConfig,
        source: &Rs,
    ) -> Result<Vec<Outcome>, ConsoleError>
    where
        Rs: RandomSource,
    {
        let mut outcomes = Vec::new();

        loop {
            let outcome = self.play(config, source).await?;
            outcomes.push(outcome);

            if outcome == Outcome::Paused {
                break;
            }

            match self.ask("Play again? [y/n] ").await? {
                Some(answer) if is_yes(&answer) => continue,
                Some(_) => break,
                None => {
                    self.say("").await?;
                    break;
                }
            }
        }

        Ok(outcomes)
    }

    pub async fn history(&mut self) -> Result<(), ConsoleError> {
        let games = self.store.all().await.map_err(ConsoleError::store)?;

        if games.is_empty() {
            return self.say("No games played yet.").await;
        }

        for (n, (_, record)) in games.iter().enumerate() {
            let secret = if record.is_finished() {
                record.secret.to_string()
            } else {
                "hidden".to_owned()
            };

            self.say(format!(
                "{:>3}. {}  {:<11}  secret: {secret}",
                n + 1,
                record.started_at.format("%Y-%m-%d %H:%M"),
                record.status.to_string(),
            ))
            .await?;

            self.say(format!(
                "     {}, {}, 0-{}",
                plural(record.config.max_attempts, "attempt", "attempts"),
                plural(record.config.code_length, "digit", "digits"),
                record.config.max_symbol()
            ))
            .await?;

            for attempt in &record.attempts {
                self.say(format!(
                    "     #{} {}  {}  {}",
                    attempt.number(),
                    attempt.guess(),
                    attempt.feedback().pegs(record.config.code_length),
                    attempt.feedback()
                ))
                .await?;
            }
        }

        Ok(())
    }

    pub async fn clear(&mut self) -> Result<(), ConsoleError> {
        let count = self.store.all().await.map_err(ConsoleError::store)?.len();
        self.store.clear().await.map_err(ConsoleError::store)?;

        info!(count, "cleared game history");

        self.say(format!("Deleted {}.", plural(count, "game", "games")))
            .await
    }

    pub async fn quota(&mut self, remote: &Remote) -> Result<(), ConsoleError> {
        let quota = remote.quota().await?;

        if quota < 0 {
            self.say(format!(
                "random.org quota is used up ({quota} bits). Secrets will be drawn locally."
            ))
            .await
        } else {
            self.say(format!("random.org allows {quota} more random bits today."))
                .await
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::{assert_eq, assert_str_eq};

    use super::{plural, Console, Outcome};
    use mastermind::{
        random::{Local, Randomness},
        store::{GameStoreAsync, Memory},
        Code, GameConfig, GameSession, GameStatus,
    };

    fn local() -> Randomness {
        Randomness::fallback_only(Local::seeded(7))
    }

    fn console(input: &str, store: Memory) -> Console<&[u8], Vec<u8>, Memory> {
        Console::new(input.as_bytes(), Vec::new(), store)
    }

    async fn with_unfinished(secret: [u32; 4]) -> Memory {
        let mut store = Memory::default();
        let game = GameSession::new(GameConfig::default(), Code::from(secret))
            .expect("hard-coded game should be valid");
        store
            .save(&game.record())
            .await
            .expect("memory store never fails to save");
        store
    }

    async fn statuses(store: &Memory) -> Vec<GameStatus> {
        store
            .all()
            .await
            .expect("memory store never fails")
            .into_iter()
            .map(|(_, record)| record.status)
            .collect()
    }

    #[test]
    fn plurals() {
        assert_str_eq!(plural(1, "guess", "guesses"), "1 guess");
        assert_str_eq!(plural(0, "guess", "guesses"), "0 guesses");
        assert_str_eq!(plural(3, "game", "games"), "3 games");
    }

    #[tokio::test]
    async fn resume_and_win() {
        let store = with_unfinished([0, 1, 2, 3]).await;
        let mut console = console("y\n3 2 1 0\n0 1 2 3\n", store);

        let outcome = console
            .play(GameConfig::default(), &local())
            .await
            .expect("game should run");
        assert_eq!(outcome, Outcome::Won);

        let (out, store) = console.into_parts();
        let out = String::from_utf8(out).expect("output is utf-8");
        assert!(out.contains("0 exact, 4 partial"));
        assert!(out.contains("You cracked it in 2 guesses!"));

        let all = store.all().await.expect("memory store never fails");
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].1.status, GameStatus::Won);
        assert_eq!(all[0].1.attempts.len(), 2);
    }

    #[tokio::test]
    async fn invalid_guesses_are_retried() {
        let store = with_unfinished([0, 1, 2, 3]).await;
        let mut console = console("y\n1 2\nfoo\n0 1 2 9\n\n0 1 2 3\n", store);

        let outcome = console
            .play(GameConfig::default(), &local())
            .await
            .expect("game should run");
        assert_eq!(outcome, Outcome::Won);

        let (out, store) = console.into_parts();
        let out = String::from_utf8(out).expect("output is utf-8");
        assert!(out.contains("code must have 4 numbers but has 2"));
        assert!(out.contains("You cracked it in 1 guess!"));

        let (_, record) = store
            .latest()
            .await
            .expect("memory store never fails")
            .expect("one game saved");
        assert_eq!(record.attempts.len(), 1);
    }

    #[tokio::test]
    async fn declining_abandons() {
        let store = with_unfinished([0, 1, 2, 3]).await;
        let mut console = console("n\n", store);

        let outcome = console
            .play(GameConfig::default(), &local())
            .await
            .expect("game should run");
        assert_eq!(outcome, Outcome::Paused);

        let (_, store) = console.into_parts();
        assert_eq!(
            statuses(&store).await,
            vec![GameStatus::Abandoned, GameStatus::InProgress]
        );
    }

    #[tokio::test]
    async fn closed_input_at_resume_keeps_game() {
        let store = with_unfinished([0, 1, 2, 3]).await;
        let mut console = console("", store);

        let outcome = console
            .play(GameConfig::default(), &local())
            .await
            .expect("game should run");
        assert_eq!(outcome, Outcome::Paused);

        let (_, store) = console.into_parts();
        assert_eq!(statuses(&store).await, vec![GameStatus::InProgress]);
    }

    #[tokio::test]
    async fn losing_reveals_secret() {
        let store = with_unfinished([0, 1, 2, 3]).await;
        let input = format!("y\n{}", "7 7 7 7\n".repeat(10));
        let mut console = console(&input, store);

        let outcome = console
            .play(GameConfig::default(), &local())
            .await
            .expect("game should run");
        assert_eq!(outcome, Outcome::Lost);

        let (out, _) = console.into_parts();
        let out = String::from_utf8(out).expect("output is utf-8");
        assert!(out.ends_with("Out of guesses. The secret was 0 1 2 3.\n"));
    }

    #[tokio::test]
    async fn fresh_game_paused_on_eof() {
        let mut console = console("", Memory::default());

        let outcome = console
            .play(GameConfig::default(), &local())
            .await
            .expect("game should run");
        assert_eq!(outcome, Outcome::Paused);

        let (_, store) = console.into_parts();
        let (_, record) = store
            .unfinished()
            .await
            .expect("memory store never fails")
            .expect("game left in progress");
        assert!(record.attempts.is_empty());
        assert!(record
            .secret
            .iter()
            .all(|&symbol| symbol < GameConfig::DEFAULT_ALPHABET_SIZE));
    }

    #[tokio::test]
    async fn play_again() {
        let store = with_unfinished([0, 1, 2, 3]).await;
        let mut console = console("y\n0 1 2 3\ny\n", store);

        let outcomes = console
            .play_rounds(GameConfig::default(), &local())
            .await
            .expect("games should run");
        assert_eq!(outcomes, vec![Outcome::Won, Outcome::Paused]);

        let (out, store) = console.into_parts();
        let out = String::from_utf8(out).expect("output is utf-8");
        assert!(out.contains("Play again? [y/n] "));
        assert_eq!(
            statuses(&store).await,
            vec![GameStatus::Won, GameStatus::InProgress]
        );
    }

    #[tokio::test]
    async fn no_more_rounds() {
        let store = with_unfinished([0, 1, 2, 3]).await;
        let mut console = console("y\n0 1 2 3\nn\n", store);

        let outcomes = console
            .play_rounds(GameConfig::default(), &local())
            .await
            .expect("games should run");
        assert_eq!(outcomes, vec![Outcome::Won]);

        let (_, store) = console.into_parts();
        assert_eq!(statuses(&store).await, vec![GameStatus::Won]);
    }

    #[tokio::test]
    async fn history_and_clear() {
        let mut store = with_unfinished([0, 1, 2, 3]).await;
        let mut finished = GameSession::new(GameConfig::default(), Code::from([4, 4, 0, 1]))
            .expect("hard-coded game should be valid");
        finished.submit_guess(Code::from([4, 0, 0, 0])).expect("game is on");
        finished.submit_guess(Code::from([4, 4, 0, 1])).expect("game is on");
        store
            .save(&finished.record())
            .await
            .expect("memory store never fails to save");

        let mut console = console("", store);

        console.history().await.expect("memory store never fails");
        console.clear().await.expect("memory store never fails");
        console.history().await.expect("memory store never fails");

        let (out, _) = console.into_parts();
        let out = String::from_utf8(out).expect("output is utf-8");
        let lines: Vec<_> = out.lines().collect();

        assert_eq!(lines.len(), 8);
        assert!(lines[0].contains("in progress"));
        assert!(lines[0].contains("secret: hidden"));
        assert_str_eq!(lines[1], "     10 attempts, 4 digits, 0-7");
        assert!(lines[2].contains("won"));
        assert!(lines[2].contains("secret: 4 4 0 1"));
        assert_str_eq!(lines[4], "     #1 4 0 0 0  OO..  2 exact, 0 partial");
        assert_str_eq!(lines[5], "     #2 4 4 0 1  OOOO  4 exact, 0 partial");
        assert_str_eq!(lines[6], "Deleted 2 games.");
        assert_str_eq!(lines[7], "No games played yet.");
    }
}
