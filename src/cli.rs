//! Stdin front end — drives an unlocked form from typed commands.

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::onboarding::{Category, OnboardingForm, Stage, SubmitOutcome, TagKey};

const HELP: &str = "\
commands:
  category <TOKEN>        one of COE CSE ECE ME CIVIL EE BioTech Mechtronics
  stage <1-4>
  type <text>             type into the tag input
  enter | space           commit the tag input
  backspace               edit the tag input, or drop the last tag
  tag <text>              type and commit in one go
  untag <index>
  bio <text>
  goal a|b on|off
  picture <index>         see `pictures`
  consent on|off
  pictures | show | submit | help | quit";

/// Which intent checkbox a `goal` command targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Goal {
    A,
    B,
}

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormCommand {
    Category(String),
    Stage(String),
    Type(String),
    Key(TagKey),
    Tag(String),
    Untag(usize),
    Bio(String),
    Goal(Goal, bool),
    Picture(usize),
    Consent(bool),
    Pictures,
    Show,
    Submit,
    Help,
    Quit,
}

fn parse_switch(s: &str) -> Result<bool, String> {
    match s {
        "on" | "yes" | "true" => Ok(true),
        "off" | "no" | "false" => Ok(false),
        other => Err(format!("expected on/off, got '{other}'")),
    }
}

fn parse_index(s: &str) -> Result<usize, String> {
    s.parse().map_err(|_| format!("expected an index, got '{s}'"))
}

/// Parse one line of input.
pub fn parse_command(line: &str) -> Result<FormCommand, String> {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    match verb {
        "category" if !rest.is_empty() => Ok(FormCommand::Category(rest.to_string())),
        "stage" if !rest.is_empty() => Ok(FormCommand::Stage(rest.to_string())),
        // The raw remainder is kept so typed spaces reach the tag input.
        "type" => Ok(FormCommand::Type(
            line.strip_prefix("type ").unwrap_or_default().to_string(),
        )),
        "enter" => Ok(FormCommand::Key(TagKey::Enter)),
        "space" => Ok(FormCommand::Key(TagKey::Space)),
        "backspace" => Ok(FormCommand::Key(TagKey::Backspace)),
        "tag" if !rest.is_empty() => Ok(FormCommand::Tag(rest.to_string())),
        "untag" => parse_index(rest).map(FormCommand::Untag),
        "bio" => Ok(FormCommand::Bio(rest.to_string())),
        "goal" => {
            let (which, switch) = rest
                .split_once(char::is_whitespace)
                .ok_or_else(|| "usage: goal a|b on|off".to_string())?;
            let goal = match which {
                "a" => Goal::A,
                "b" => Goal::B,
                other => return Err(format!("unknown goal '{other}'")),
            };
            Ok(FormCommand::Goal(goal, parse_switch(switch.trim())?))
        }
        "picture" => parse_index(rest).map(FormCommand::Picture),
        "consent" => parse_switch(rest).map(FormCommand::Consent),
        "pictures" => Ok(FormCommand::Pictures),
        "show" => Ok(FormCommand::Show),
        "submit" => Ok(FormCommand::Submit),
        "help" => Ok(FormCommand::Help),
        "quit" | "exit" => Ok(FormCommand::Quit),
        "" => Err("empty command".to_string()),
        other => Err(format!("unknown command '{other}', try 'help'")),
    }
}

/// Text to print after a command, and whether the session is over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub done: bool,
}

impl Reply {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            done: false,
        }
    }

    fn changed(changed: bool) -> Self {
        Self::text(if changed { "ok" } else { "unchanged" })
    }
}

/// Apply a command to the form.
pub async fn execute(form: &mut OnboardingForm, command: FormCommand) -> Reply {
    match command {
        FormCommand::Category(token) => Reply::changed(form.set_category(token)),
        FormCommand::Stage(token) => Reply::changed(form.set_stage(token)),
        FormCommand::Type(text) => {
            form.type_tag(&text);
            Reply::text(format!("draft: '{}'", form.tag_draft()))
        }
        FormCommand::Key(key) => Reply::changed(form.tag_key(key)),
        FormCommand::Tag(text) => {
            let typed = form.type_tag(&text);
            let committed = form.commit_tag();
            Reply::changed(typed || committed)
        }
        FormCommand::Untag(index) => Reply::changed(form.remove_tag(index)),
        FormCommand::Bio(text) => Reply::changed(form.set_bio(text)),
        FormCommand::Goal(Goal::A, on) => Reply::changed(form.set_wants_type_a(on)),
        FormCommand::Goal(Goal::B, on) => Reply::changed(form.set_wants_type_b(on)),
        FormCommand::Picture(index) => Reply::changed(form.select_picture_at(index)),
        FormCommand::Consent(on) => Reply::changed(form.set_consent(on)),
        FormCommand::Pictures => Reply::text(
            form.picture_candidates()
                .iter()
                .enumerate()
                .map(|(i, url)| format!("  [{i}] {url}"))
                .collect::<Vec<_>>()
                .join("\n"),
        ),
        FormCommand::Show => Reply::text(render(form)),
        FormCommand::Help => Reply::text(HELP),
        FormCommand::Quit => Reply {
            text: "bye".to_string(),
            done: true,
        },
        FormCommand::Submit => match form.submit().await {
            SubmitOutcome::Navigated => Reply {
                text: format!("saved, continuing to {}", form.config().dashboard_path),
                done: true,
            },
            SubmitOutcome::Rejected(_) => Reply::text(render(form)),
            SubmitOutcome::Failed(message) => {
                Reply::text(format!("could not save ({message}), try again"))
            }
            SubmitOutcome::Ignored => Reply::text("submit is not available right now"),
        },
    }
}

/// Render the form as plain text.
pub fn render(form: &OnboardingForm) -> String {
    let values = form.values();
    let errors = form.visible_errors();
    let mut lines = Vec::new();

    let categories: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();
    lines.push(format!(
        "category: {} ({})",
        values.category.as_deref().unwrap_or("-"),
        categories.join("/")
    ));
    lines.push(format!(
        "stage: {} ({})",
        values.stage.as_deref().unwrap_or("-"),
        Stage::TOKENS.join("/")
    ));
    lines.push(format!(
        "tags: [{}] draft '{}' ({})",
        values.tags.join(", "),
        form.tag_draft(),
        form.tag_placeholder()
    ));
    lines.push(format!("bio: {:?} {}", values.bio, form.bio_counter()));
    lines.push(format!(
        "goals: a={} b={}",
        values.wants_type_a, values.wants_type_b
    ));
    lines.push(format!(
        "picture: {}",
        if values.picture_url.is_empty() { "-" } else { values.picture_url.as_str() }
    ));
    lines.push(format!("consent: {}", values.consent));

    for (field, message) in errors.iter() {
        lines.push(format!("  ! {field}: {message}"));
    }
    if let Some(err) = form.last_error() {
        lines.push(format!("  ! save failed: {err}"));
    }
    lines.join("\n")
}

/// Read commands from stdin until the form navigates away or input ends.
pub async fn run(form: &mut OnboardingForm) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    eprintln!("{}\n", render(form));
    eprint!("> ");

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if line.trim().is_empty() {
                    eprint!("> ");
                    continue;
                }
                match parse_command(&line) {
                    Ok(command) => {
                        let reply = execute(form, command).await;
                        println!("{}", reply.text);
                        if reply.done {
                            break;
                        }
                    }
                    Err(e) => eprintln!("{e}"),
                }
                eprint!("> ");
            }
            Ok(None) => break,
            Err(e) => {
                tracing::error!("Error reading stdin: {}", e);
                break;
            }
        }
    }
}
