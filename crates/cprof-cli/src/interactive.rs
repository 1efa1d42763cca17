//! Interactive session: profile more URLs or ask questions about the
//! companies profiled so far.

use std::collections::VecDeque;
use std::fmt::Write as _;
use std::io::{BufRead, Write};

use cprof_core::{parse_website_url, CompanyProfile};
use cprof_insights::GeminiClient;
use cprof_profiler::Profiler;
use tokio::sync::mpsc;

use crate::report::{profile_context, render_run};

/// Question/answer pairs kept in the chat prompt.
const MAX_HISTORY_TURNS: usize = 10;

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Input {
    Blank,
    Exit,
    Profile(String),
    Question(String),
}

pub(crate) fn classify(line: &str) -> Input {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Input::Blank;
    }
    if trimmed.eq_ignore_ascii_case("exit") || trimmed.eq_ignore_ascii_case("quit") {
        return Input::Exit;
    }
    if parse_website_url(trimmed).is_ok() {
        return Input::Profile(trimmed.to_string());
    }
    Input::Question(trimmed.to_string())
}

#[derive(Debug, Default)]
pub(crate) struct ChatSession {
    profiles: Vec<CompanyProfile>,
    history: VecDeque<(String, String)>,
}

impl ChatSession {
    /// Add or replace a profile in the session context.
    pub(crate) fn remember(&mut self, profile: CompanyProfile) {
        match self
            .profiles
            .iter_mut()
            .find(|p| p.website_url == profile.website_url)
        {
            Some(existing) => *existing = profile,
            None => self.profiles.push(profile),
        }
    }

    pub(crate) fn record_turn(&mut self, question: String, answer: String) {
        self.history.push_back((question, answer));
        while self.history.len() > MAX_HISTORY_TURNS {
            self.history.pop_front();
        }
    }

    pub(crate) fn build_prompt(&self, question: &str) -> String {
        let mut prompt = String::from(
            "You are a business analyst answering questions about companies that were \
             profiled from their websites and recent news. Answer from the profiles below; \
             say so when they do not contain the answer.\n",
        );

        if self.profiles.is_empty() {
            prompt.push_str("\nNo companies have been profiled yet.\n");
        }
        for (i, profile) in self.profiles.iter().enumerate() {
            let _ = write!(prompt, "\n### Profile {}\n{}", i + 1, profile_context(profile));
        }

        if !self.history.is_empty() {
            prompt.push_str("\n### Conversation so far\n");
            for (q, a) in &self.history {
                let _ = writeln!(prompt, "User: {q}\nAssistant: {a}");
            }
        }

        let _ = write!(prompt, "\n### Question\n{question}\n");
        prompt
    }
}

/// Profile `first_url`, then serve stdin until `exit`, `quit` or EOF.
///
/// Profile failures are printed and the session continues.
///
/// # Errors
///
/// Returns an error only when writing to stdout fails.
pub(crate) async fn run(
    profiler: &Profiler,
    gemini: &GeminiClient,
    first_url: &str,
) -> anyhow::Result<()> {
    let mut session = ChatSession::default();
    profile_url(profiler, &mut session, first_url).await;

    println!("\nEnter a website URL to profile it, ask a question about the profiled companies, or type 'exit'.");
    let mut lines = spawn_stdin_reader();

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.recv().await else {
            break;
        };

        match classify(&line) {
            Input::Blank => {}
            Input::Exit => break,
            Input::Profile(url) => profile_url(profiler, &mut session, &url).await,
            Input::Question(question) => {
                let prompt = session.build_prompt(&question);
                match gemini.generate_text(&prompt).await {
                    Ok(answer) => {
                        println!("\n{}\n", answer.trim());
                        session.record_turn(question, answer.trim().to_string());
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "chat generation failed");
                        println!("\nCould not get an answer: {e}\n");
                    }
                }
            }
        }
    }
    Ok(())
}

async fn profile_url(profiler: &Profiler, session: &mut ChatSession, url: &str) {
    match profiler.run(url).await {
        Ok(run) => {
            println!("{}", render_run(&run));
            session.remember(run.profile);
        }
        Err(e) => {
            tracing::error!(url, error = %e, "profile run failed");
            println!("error: {e}");
        }
    }
}

/// Reads stdin on a plain thread so a pending read never holds up shutdown.
fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    rx
}
