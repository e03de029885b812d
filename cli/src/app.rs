//! The event loop: user commands and request completions, one at a time.

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use todo_sync::{HttpResponse, Outgoing, TaskId, Ticket, TodoClient, TodoList, TransportError};

use crate::command::{Command, CommandError, HELP};
use crate::config::Args;
use crate::{transport, view};

type Completion = (Ticket, Result<HttpResponse, TransportError>);

/// What the loop should do after a command was applied to the list.
#[derive(Debug)]
pub enum Step {
    Dispatch(Outgoing),
    Render,
    Help,
    Quit,
}

pub fn handle(list: &mut TodoList, command: Command) -> Result<Step, CommandError> {
    let step = match command {
        Command::Add(text) => {
            if let Some(text) = text {
                list.set_draft(text);
            }
            Step::Dispatch(list.add()?)
        }
        Command::Draft(text) => {
            list.set_draft(text);
            Step::Render
        }
        Command::Toggle(n) => {
            let id = row_id(list, n)?;
            Step::Dispatch(list.toggle_complete(&id)?)
        }
        Command::Edit(n) => {
            let id = row_id(list, n)?;
            list.begin_edit(&id)?;
            Step::Render
        }
        Command::Text(text) => {
            list.set_edit_text(text)?;
            Step::Render
        }
        Command::Save => Step::Dispatch(list.save_edit()?),
        Command::Cancel => {
            list.cancel_edit();
            Step::Render
        }
        Command::Delete(n) => {
            let id = row_id(list, n)?;
            Step::Dispatch(list.delete(&id)?)
        }
        Command::List => Step::Render,
        Command::Reload => Step::Dispatch(list.load()),
        Command::Help => Step::Help,
        Command::Quit => Step::Quit,
    };
    Ok(step)
}

/// Validation failures read as alerts; everything else as an error line.
pub fn report(err: &CommandError) -> String {
    match err {
        CommandError::Sync(e) if e.is_validation() => format!("! {e}"),
        e => format!("error: {e}"),
    }
}

fn row_id(list: &TodoList, n: usize) -> Result<TaskId, CommandError> {
    n.checked_sub(1)
        .and_then(|i| list.tasks().get(i))
        .map(|t| t.id.clone())
        .ok_or(CommandError::NoSuchRow(n))
}

/// Run the request on the blocking pool and post its outcome to the loop.
fn dispatch(agent: &ureq::Agent, tx: &mpsc::UnboundedSender<Completion>, outgoing: Outgoing) {
    let agent = agent.clone();
    let tx = tx.clone();
    let Outgoing { ticket, request } = outgoing;
    tracing::debug!(%ticket, method = request.method.as_str(), path = %request.path, "dispatch");
    tokio::task::spawn_blocking(move || {
        let outcome = transport::execute(&agent, request);
        if tx.send((ticket, outcome)).is_err() {
            tracing::debug!(%ticket, "event loop gone, dropping completion");
        }
    });
}

pub async fn run(args: Args) -> anyhow::Result<()> {
    let mut list = TodoList::new(TodoClient::new(&args.base_url));
    let agent = transport::agent();
    let (tx, mut rx) = mpsc::unbounded_channel::<Completion>();
    tracing::info!(base_url = %args.base_url, "starting");

    dispatch(&agent, &tx, list.load());
    println!("type `help` for commands");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let step = Command::parse(&line)
                    .and_then(|command| command.map(|c| handle(&mut list, c)).transpose());
                match step {
                    Ok(None) => {}
                    Ok(Some(Step::Quit)) => break,
                    Ok(Some(Step::Help)) => println!("{HELP}"),
                    Ok(Some(Step::Render)) => print!("{}", view::render(&list)),
                    Ok(Some(Step::Dispatch(outgoing))) => {
                        dispatch(&agent, &tx, outgoing);
                        print!("{}", view::render(&list));
                    }
                    Err(e) => println!("{}", report(&e)),
                }
            }
            Some((ticket, outcome)) = rx.recv() => {
                match list.complete(ticket, outcome) {
                    Ok(applied) => tracing::info!(%ticket, ?applied, "completed"),
                    Err(e) => println!("error: {e}"),
                }
                print!("{}", view::render(&list));
            }
        }
    }

    tracing::info!(in_flight = list.in_flight(), "exiting");
    Ok(())
}
