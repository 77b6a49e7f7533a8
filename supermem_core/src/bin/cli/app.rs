use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;

use supermem_core::questions::build_question;
use supermem_core::users::{is_password_valid, is_username_valid, VALID_PASSWORD_MSG, VALID_USERNAME_MSG};
use supermem_core::{
    answer_question, generate_quiz, track_stats, unlock_next_word, Credentials, Database, Direction, Error,
    OrderingMode, SessionStats, User,
};

use crate::console::Console;

const HOME_OPTIONS: [&str; 4] = [
    "Learn a new word",
    "Take a quiz",
    "Start learning a new language",
    "Show my progress",
];

/// Interactive session: index page, login/registration and the home page
pub struct App {
    pub console: Console,
    pub db: Database,
    credentials: Box<dyn Credentials>,
    rng: StdRng,
}

impl App {
    pub fn new(console: Console, db: Database, credentials: Box<dyn Credentials>) -> Self {
        Self {
            console,
            db,
            credentials,
            rng: StdRng::from_entropy(),
        }
    }

    /// Run until the user exits the index page.
    pub fn run(&mut self) -> Result<()> {
        loop {
            self.console.print_big("Welcome to SuperMem!")?;
            let option = self
                .console
                .ask_option_num("Choose an option, or type \"exit\":", &["Login", "Register"])?;
            match option {
                None => return Ok(()),
                Some(0) => {
                    if let Some(user) = self.login()? {
                        self.home(user)?;
                    }
                }
                Some(_) => self.register()?,
            }
        }
    }

    /// Run the session, then save even if it ended with an error.
    pub fn run_and_save(&mut self) -> Result<()> {
        let session = self.run();
        let saved = self.save();
        session.and(saved)
    }

    fn save(&self) -> Result<()> {
        self.db
            .save()
            .with_context(|| format!("Failed to save users to {}", self.db.users_file().display()))
    }

    fn login(&mut self) -> Result<Option<usize>> {
        self.console.print_big("Login to SuperMem")?;
        loop {
            let Some(username) = self.console.ask_for("Username: ")? else {
                return Ok(None);
            };
            let Some(password) = self.console.ask_password("Password: ")? else {
                return Ok(None);
            };
            match self
                .db
                .users
                .authenticate(&username, &password, self.credentials.as_ref())
            {
                Ok(user) => return Ok(Some(user)),
                Err(e) => self.console.print(&format!("{}. Try again.", e))?,
            }
        }
    }

    fn register(&mut self) -> Result<()> {
        self.console.print_big("Register to SuperMem")?;
        let languages = self.db.dictionaries.all_languages();
        if languages.is_empty() {
            self.console
                .print("No dictionaries are installed, so there is nothing to learn yet.")?;
            return Ok(());
        }

        let username = loop {
            let Some(username) = self.console.ask_for("Choose a username: ")? else {
                return Ok(());
            };
            if !is_username_valid(&username) {
                self.console
                    .print(&format!("Invalid username. {}", VALID_USERNAME_MSG))?;
            } else if self.db.users.find(&username).is_some() {
                self.console
                    .print(&format!("Username {} is already taken.", username))?;
            } else {
                break username;
            }
        };

        let password = loop {
            let Some(password) = self.console.ask_password("Choose a password: ")? else {
                return Ok(());
            };
            if is_password_valid(&password) {
                break password;
            }
            self.console
                .print(&format!("Invalid password. {}", VALID_PASSWORD_MSG))?;
        };

        let Some(choice) = self
            .console
            .ask_option_num("What's your main language?", &languages)?
        else {
            return Ok(());
        };
        self.db
            .users
            .register(&username, &password, &languages[choice], self.credentials.as_ref())?;
        self.console
            .print(&format!("User {} created successfully.", username))?;
        Ok(())
    }

    fn home(&mut self, user: usize) -> Result<()> {
        loop {
            let title = format!("Home Page of {}", self.user(user)?.username);
            self.console.print_big(&title)?;
            let option = self
                .console
                .ask_option_num("Choose an option, or type \"exit\":", &HOME_OPTIONS)?;
            match option {
                None => return Ok(()),
                Some(0) => self.learn_word(user)?,
                Some(1) => self.quiz(user)?,
                Some(2) => self.add_language(user)?,
                Some(_) => self.show_progress(user)?,
            }
        }
    }

    fn user(&self, user: usize) -> Result<&User> {
        self.db.users.get(user).context("Logged-in user is missing from the roster")
    }

    /// Let the user pick one of their usable tracks, optionally only those with learned words.
    fn choose_language(&mut self, user: usize, needs_words: bool) -> Result<Option<String>> {
        let languages: Vec<String> = self
            .user(user)?
            .tracks
            .iter()
            .filter(|t| t.is_usable() && (!needs_words || t.unlocked > 0))
            .map(|t| t.language.clone())
            .collect();
        if languages.is_empty() {
            let msg = if needs_words {
                "Learn some words first."
            } else {
                "You are not learning any language yet. Start one from the home page."
            };
            self.console.print(msg)?;
            return Ok(None);
        }
        Ok(self
            .console
            .ask_option_num("Which language?", &languages)?
            .map(|i| languages[i].clone()))
    }

    fn learn_word(&mut self, user: usize) -> Result<()> {
        let Some(language) = self.choose_language(user, false)? else {
            return Ok(());
        };
        let learner = self
            .db
            .users
            .get_mut(user)
            .context("Logged-in user is missing from the roster")?;
        let main_language = learner.main_language.clone();
        let track = learner
            .track_mut(&language)
            .context("Chosen language is no longer active")?;

        match unlock_next_word(track) {
            Ok(word) => {
                let question = build_question(&main_language, track.dictionary()?, &word, Direction::FromMain);
                self.console.print(&format!(
                    "New word: {} ({}) = {} ({}), level {}, {}",
                    question.asked,
                    question.asked_language,
                    question.expected,
                    question.expected_language,
                    word.level,
                    word.word_type
                ))?;
            }
            Err(e @ Error::OutOfRange { .. }) => self.console.print(&e.to_string())?,
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }

    fn quiz(&mut self, user: usize) -> Result<()> {
        let Some(language) = self.choose_language(user, true)? else {
            return Ok(());
        };
        let labels: Vec<&str> = OrderingMode::ALL.iter().map(|m| m.label()).collect();
        let Some(mode) = self
            .console
            .ask_option_num("How should the words be ordered?", &labels)?
        else {
            return Ok(());
        };

        let main_language = self.user(user)?.main_language.clone();
        let directions = [
            format!("{} to {}", main_language, language),
            format!("{} to {}", language, main_language),
        ];
        let Some(direction) = self
            .console
            .ask_option_num("Which way should I ask?", &directions)?
        else {
            return Ok(());
        };
        let direction = if direction == 0 {
            Direction::FromMain
        } else {
            Direction::FromLearning
        };

        let learner = self
            .db
            .users
            .get(user)
            .context("Logged-in user is missing from the roster")?;
        let questions = generate_quiz(
            learner,
            &language,
            OrderingMode::ALL[mode],
            direction,
            &mut self.rng,
        )?;
        let mut stats = SessionStats::default();
        for question in &questions {
            let Some(answer) = self.console.ask_for(&question.prompt())? else {
                break;
            };
            let track = self
                .db
                .users
                .get_mut(user)
                .and_then(|u| u.track_mut(&language))
                .context("Quiz language is no longer active")?;
            let outcome = answer_question(track, question, &answer)?;
            stats.record(&outcome);
            self.console.print(&format!(
                "{} (confidence {})",
                outcome.feedback, outcome.confidence
            ))?;
        }

        self.console.print(&format!(
            "Quiz finished: {} of {} correct ({:.0}%).",
            stats.correct,
            stats.asked,
            stats.accuracy_percent()
        ))?;
        Ok(())
    }

    fn add_language(&mut self, user: usize) -> Result<()> {
        let learner = self.user(user)?;
        let main_language = learner.main_language.clone();
        let candidates: Vec<String> = self
            .db
            .dictionaries
            .languages_paired_with(&main_language)
            .into_iter()
            .filter(|l| !learner.is_learning(l))
            .collect();
        if candidates.is_empty() {
            self.console
                .print(&format!("There are no new languages to learn from {}.", main_language))?;
            return Ok(());
        }

        let Some(choice) = self
            .console
            .ask_option_num("Which language do you want to learn?", &candidates)?
        else {
            return Ok(());
        };
        let learner = self
            .db
            .users
            .get_mut(user)
            .context("Logged-in user is missing from the roster")?;
        match learner.start_learning(&candidates[choice], &self.db.dictionaries) {
            Ok(track) => {
                let msg = format!("You started learning {}.", track.language);
                self.console.print(&msg)?;
            }
            Err(e @ (Error::Validation(_) | Error::Link { .. })) => self.console.print(&e.to_string())?,
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }

    fn show_progress(&mut self, user: usize) -> Result<()> {
        let lines: Vec<String> = self
            .user(user)?
            .tracks
            .iter()
            .map(|track| {
                let stats = track_stats(track);
                match stats.available {
                    Some(available) => format!(
                        "{}: {}/{} words unlocked, {} mastered, average confidence {:.1}",
                        stats.language, stats.unlocked, available, stats.mastered, stats.average_confidence
                    ),
                    None => format!("{}: no dictionary available", stats.language),
                }
            })
            .collect();
        if lines.is_empty() {
            self.console.print("You are not learning any language yet.")?;
        }
        for line in lines {
            self.console.print(&line)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::fs;
    use std::io::{self, BufReader, Cursor, Read, Write};
    use std::rc::Rc;
    use supermem_core::{Config, Diagnostics};
    use tempfile::TempDir;

    struct ReversedCredentials;

    impl Credentials for ReversedCredentials {
        fn hash(&self, password: &str) -> supermem_core::Result<String> {
            Ok(password.chars().rev().collect())
        }

        fn verify(&self, password: &str, hash: &str) -> bool {
            password.chars().rev().collect::<String>() == hash
        }
    }

    #[derive(Clone, Default)]
    struct SharedOutput(Rc<RefCell<Vec<u8>>>);

    impl Write for SharedOutput {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Input that breaks once the scripted part has been read
    struct BrokenInput;

    impl Read for BrokenInput {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "console closed"))
        }
    }

    fn open_db(dir: &TempDir) -> Database {
        let dict_dir = dir.path().join("dictionaries");
        fs::create_dir_all(&dict_dir).unwrap();
        fs::write(
            dict_dir.join("fr_en.txt"),
            "__language_a=French\n__language_b=English\nchat, cat, 1, noun\nchien, dog, 2, noun\n",
        )
        .unwrap();
        let config = Config {
            users_file: dir.path().join("users.txt"),
            dictionaries_dir: dict_dir,
            log_level: "warn".to_string(),
        };
        Database::open(&config, None, &mut Diagnostics::new()).unwrap()
    }

    #[test]
    fn test_full_session_is_saved() {
        let dir = TempDir::new().unwrap();
        // register (main English) -> duplicate register -> login -> add French
        // -> learn 1 word -> quiz (easiest first, English to French) -> progress
        let script = "2\nbob\nbob\nsecret1\n2\n\
                      2\nbob\nexit\n\
                      1\nbob\nwrong1\nbob\nsecret1\n\
                      3\n1\n\
                      1\n1\n\
                      2\n1\n1\n1\nchat\n\
                      4\n\
                      exit\nexit\n";
        let output = SharedOutput::default();
        let console = Console::new(
            Box::new(Cursor::new(script.as_bytes().to_vec())),
            Box::new(output.clone()),
            false,
        );
        let mut app = App::new(console, open_db(&dir), Box::new(ReversedCredentials));
        app.run().unwrap();
        app.save().unwrap();

        let printed = String::from_utf8(output.0.borrow().clone()).unwrap();
        assert!(printed.contains("Invalid password."));
        assert!(printed.contains("User bob created successfully."));
        assert!(printed.contains("Username bob is already taken."));
        assert!(printed.contains("Wrong username or password. Try again."));
        assert!(printed.contains("New word: cat (English) = chat (French), level 1, noun"));
        assert!(printed.contains("Correct! (confidence 1)"));
        assert!(printed.contains("French: 1/2 words unlocked"));

        assert_eq!(
            fs::read_to_string(dir.path().join("users.txt")).unwrap(),
            "bob, 1terces, English, French, 1, 1\n"
        );
    }

    #[test]
    fn test_progress_is_saved_when_console_fails() {
        let dir = TempDir::new().unwrap();
        let script = "2\ncarol\nsecret1\n2\n";
        let input = BufReader::new(Cursor::new(script.as_bytes().to_vec()).chain(BrokenInput));
        let console = Console::new(Box::new(input), Box::new(io::sink()), false);
        let mut app = App::new(console, open_db(&dir), Box::new(ReversedCredentials));

        assert!(app.run_and_save().is_err());
        assert_eq!(
            fs::read_to_string(dir.path().join("users.txt")).unwrap(),
            "carol, 1terces, English, _, _, _\n"
        );
    }
}
