use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::chat::{Session, Turn};
use crate::core::AppConfig;
use crate::deepseek::{DeepSeekClient, Message, Role};

const HELP: &str = "\
Commands:
  /new        start a new chat (the current one is archived)
  /chats      list archived chats
  /open <n>   open archived chat number <n>
  /show       show the current chat again
  /help       show this message
  /quit       exit
Anything else is sent as a message.";

/// A line of input from the prompt.
#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    Submit(String),
    NewChat,
    ListChats,
    OpenChat(usize),
    Show,
    Help,
    Quit,
    Empty,
    Invalid(String),
}

impl Input {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Input::Empty;
        }
        let Some(command) = line.strip_prefix('/') else {
            return Input::Submit(line.to_string());
        };

        let mut parts = command.split_whitespace();
        match (parts.next(), parts.next(), parts.next()) {
            (Some("new"), None, _) => Input::NewChat,
            (Some("chats"), None, _) => Input::ListChats,
            (Some("show"), None, _) => Input::Show,
            (Some("help"), None, _) => Input::Help,
            (Some("quit" | "exit"), None, _) => Input::Quit,
            (Some("open"), Some(n), None) => match n.parse::<usize>() {
                Ok(n) => Input::OpenChat(n),
                Err(_) => Input::Invalid(format!("Not a chat number: {}", n)),
            },
            (Some("open"), _, _) => Input::Invalid(String::from("Usage: /open <n>")),
            _ => Input::Invalid(format!("Unknown command: {}. Try /help", line)),
        }
    }
}

fn render_message(msg: &Message) -> String {
    let speaker = match msg.role() {
        Role::Assistant => "🤖 assistant",
        Role::User => "🧑 user",
    };
    format!("{}\n{}\n", speaker, msg.content())
}

/// Renders a whole chat the way it is shown on screen.
pub fn render_transcript(messages: &[Message]) -> String {
    messages
        .iter()
        .map(render_message)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders the list of archived chats, marking the one that is open.
pub fn render_chat_list(session: &Session) -> String {
    let titles = session.chat_titles();
    if titles.is_empty() {
        return String::from("📜 Chat History is empty");
    }
    let mut out = String::from("📜 Chat History\n");
    for (i, title) in titles.iter().enumerate() {
        let marker = if session.selected_index() == Some(i) {
            "▶"
        } else {
            " "
        };
        let turns = session
            .archived(i)
            .map(|c| c.user_turns())
            .unwrap_or_default();
        out.push_str(&format!("{} {} ({} messages sent)\n", marker, title, turns));
    }
    out
}

pub fn render_turn(turn: &Turn) -> String {
    format!(
        "{}\nResponse time: {:.2}s",
        render_message(&Message::new(Role::Assistant, &turn.transcript_text())),
        turn.elapsed.as_secs_f64()
    )
}

pub async fn run(config: AppConfig) -> Result<()> {
    let mut rl = DefaultEditor::new()?;
    let client = DeepSeekClient::new(&config);
    let mut session = Session::new();

    println!("🤖 DeepSeek AI Chatbot ({})", client.model());
    println!("{}", HELP);
    println!();
    println!("{}", render_transcript(session.active_messages()));

    loop {
        let readline = rl.readline(">>> ");
        let line = match readline {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => break,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        };
        let _ = rl.add_history_entry(line.as_str());

        match Input::parse(&line) {
            Input::Submit(text) => {
                println!("Thinking...");
                let turn = session.submit(&text, &client).await;
                println!("{}", render_turn(&turn));
            }
            Input::NewChat => {
                session.start_new_chat();
                println!("{}", render_transcript(session.active_messages()));
            }
            Input::ListChats => print!("{}", render_chat_list(&session)),
            Input::OpenChat(number) => match session.index_for_chat_number(number) {
                Some(index) => {
                    session.select_archived(index)?;
                    println!("{}", render_transcript(session.active_messages()));
                }
                None => println!("No chat number {}. Try /chats", number),
            },
            Input::Show => println!("{}", render_transcript(session.active_messages())),
            Input::Help => println!("{}", HELP),
            Input::Quit => break,
            Input::Empty => {}
            Input::Invalid(msg) => println!("{}", msg),
        }
    }

    Ok(())
}
