//! Interactive review session.
//!
//! Reads one command per line from stdin and drives a [`ReviewController`],
//! re-rendering the part of the page each command touched.

use thiserror::Error;
use std::future::Future;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::session::ReviewController;
use crate::ui::{self, Spinner, Status};

pub const HELP: &str = "\
Commands:
  question <text>     Set the research question
  abstract            Generate an abstract for the question
  search-string       Generate a PubMed search string
  edit <text>         Replace the search string
  search              Count PubMed results for the search string
  find                Find papers and their availability
  next | prev         Move between pages of papers
  toggle <n>          Show or hide the abstract of paper n
  download            Bulk download available papers to papers.zip
  export              Write research-results.json
  show                Show the whole session
  help                Show this help
  quit                Leave";

/// A parsed interactive command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Question(String),
    Abstract,
    SearchString,
    Edit(String),
    Search,
    Find,
    Next,
    Prev,
    Toggle(usize),
    Download,
    Export,
    Show,
    Help,
    Quit,
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Unknown command `{0}`, type `help` for a list")]
    Unknown(String),

    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),

    #[error("`{0}` is not a paper number")]
    InvalidNumber(String),
}

impl std::str::FromStr for ReplCommand {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(ReplCommand::Empty);
        }

        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_lowercase().as_str() {
            "question" => {
                if rest.is_empty() {
                    return Err(ParseError::MissingArgument("question"));
                }
                ReplCommand::Question(rest.to_string())
            }
            "abstract" => ReplCommand::Abstract,
            "search-string" | "searchstring" => ReplCommand::SearchString,
            "edit" => {
                if rest.is_empty() {
                    return Err(ParseError::MissingArgument("edit"));
                }
                ReplCommand::Edit(rest.to_string())
            }
            "search" => ReplCommand::Search,
            "find" => ReplCommand::Find,
            "next" | "n" => ReplCommand::Next,
            "prev" | "p" => ReplCommand::Prev,
            "toggle" | "t" => {
                if rest.is_empty() {
                    return Err(ParseError::MissingArgument("toggle"));
                }
                let n = rest
                    .parse::<usize>()
                    .map_err(|_| ParseError::InvalidNumber(rest.to_string()))?;
                ReplCommand::Toggle(n)
            }
            "download" => ReplCommand::Download,
            "export" => ReplCommand::Export,
            "show" => ReplCommand::Show,
            "help" | "?" => ReplCommand::Help,
            "quit" | "exit" | "q" => ReplCommand::Quit,
            other => return Err(ParseError::Unknown(other.to_string())),
        };
        Ok(command)
    }
}

/// Whether the loop should keep going after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Print everything the session currently holds
pub fn show(controller: &ReviewController, width: usize) {
    let state = controller.state();
    ui::print_section("Research Question");
    if state.question.is_empty() {
        println!("(none)");
    } else {
        println!("{}", state.question);
    }

    if state.generated_abstract.visible {
        println!("{}", ui::render_abstract(&state.generated_abstract, width));
    }
    if !state.search_string.is_empty() {
        println!("{}", ui::render_search_string(&state.search_string));
    }
    println!("{}", ui::render_result_count(state.result_count));
    if !state.papers.is_empty() {
        println!("{}", ui::render_papers(state, width));
    }
    if let Some(error) = &state.error {
        println!("{}", ui::render_error(error));
    }
}

/// Run one command against the controller
pub async fn execute(controller: &mut ReviewController, command: ReplCommand, width: usize) -> Flow {
    match command {
        ReplCommand::Empty => {}
        ReplCommand::Help => println!("{}", HELP),
        ReplCommand::Quit => return Flow::Quit,
        ReplCommand::Show => show(controller, width),
        ReplCommand::Question(text) => {
            controller.set_question(text);
            ui::print_status(Status::Success, "Question set");
        }
        ReplCommand::Edit(text) => {
            controller.edit_search_string(text);
            println!("{}", ui::render_search_string(&controller.state().search_string));
        }
        ReplCommand::Abstract => {
            let spinner = Spinner::new("Generating abstract...");
            let result = controller.generate_abstract().await;
            spinner.finish();
            match result {
                Ok(()) => println!(
                    "{}",
                    ui::render_abstract(&controller.state().generated_abstract, width)
                ),
                Err(err) => println!("{}", ui::render_error(&err)),
            }
        }
        ReplCommand::SearchString => {
            let spinner = Spinner::new("Generating search string...");
            let result = controller.generate_search_string().await;
            spinner.finish();
            match result {
                Ok(()) => println!("{}", ui::render_search_string(&controller.state().search_string)),
                Err(err) => println!("{}", ui::render_error(&err)),
            }
        }
        ReplCommand::Search => {
            let spinner = Spinner::new("Searching PubMed...");
            let result = controller.search_pubmed().await;
            spinner.finish();
            match result {
                Ok(count) => println!("{}", ui::render_result_count(Some(count))),
                Err(err) => println!("{}", ui::render_error(&err)),
            }
        }
        ReplCommand::Find => {
            let spinner = Spinner::new("Finding papers...");
            let result = controller.find_pdfs().await;
            spinner.finish();
            match result {
                Ok(_) => println!("{}", ui::render_papers(controller.state(), width)),
                Err(err) => println!("{}", ui::render_error(&err)),
            }
        }
        ReplCommand::Next => {
            controller.next_page();
            println!("{}", ui::render_papers(controller.state(), width));
        }
        ReplCommand::Prev => {
            controller.prev_page();
            println!("{}", ui::render_papers(controller.state(), width));
        }
        ReplCommand::Toggle(n) => match controller.toggle_abstract(n) {
            Some(_) => println!("{}", ui::render_papers(controller.state(), width)),
            None => ui::print_status(Status::Warning, &format!("No paper {} on this page", n)),
        },
        ReplCommand::Download => {
            let spinner = Spinner::new("Preparing bulk download...");
            let result = controller.bulk_download().await;
            spinner.finish();
            match result {
                Ok(outcome) => println!("{}", ui::render_download(&outcome)),
                Err(err) => println!("{}", ui::render_error(&err)),
            }
        }
        ReplCommand::Export => match controller.export() {
            Ok(path) => ui::print_status(Status::Success, &format!("Exported to {}", path.display())),
            Err(err) => ui::print_status(Status::Error, &err.to_string()),
        },
    }
    Flow::Continue
}

/// Read commands from stdin until `quit`, end of input or Ctrl-C
pub async fn run(controller: &mut ReviewController, width: usize) -> std::io::Result<()> {
    let input = BufReader::new(tokio::io::stdin());
    run_until(controller, input, width, tokio::signal::ctrl_c()).await
}

/// Drive the session from `input` until `quit`, end of input or `shutdown`
///
/// `shutdown` is also raced against the running command, so a request that
/// never answers can still be abandoned.
pub async fn run_until<R, S>(
    controller: &mut ReviewController,
    input: R,
    width: usize,
    shutdown: S,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    S: Future,
{
    use std::io::Write;

    let mut lines = input.lines();
    tokio::pin!(shutdown);

    loop {
        println!("{}", ui::render_next_steps(controller.state().affordances()));
        print!("litreview> ");
        std::io::stdout().flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = &mut shutdown => None,
        };
        let Some(line) = line else {
            println!();
            break;
        };

        let command = match line.parse::<ReplCommand>() {
            Ok(command) => command,
            Err(err) => {
                ui::print_status(Status::Warning, &err.to_string());
                continue;
            }
        };
        tracing::trace!(?command, "Interactive command");

        let flow = tokio::select! {
            flow = execute(controller, command, width) => Some(flow),
            _ = &mut shutdown => None,
        };
        match flow {
            Some(Flow::Continue) => {}
            Some(Flow::Quit) => break,
            None => {
                controller.interrupt();
                println!();
                ui::print_status(Status::Warning, "Interrupted");
                break;
            }
        }
    }

    Ok(())
}
