//! Drives the command layer against a live mock server, executing each
//! dispatched request with the real ureq transport.

use todo_cli::app::{handle, report, Step};
use todo_cli::command::Command;
use todo_cli::{transport, view};
use todo_sync::{TaskId, TodoClient, TodoList};

fn start_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}/todos")
}

/// Parse and apply one line, running any request to completion.
fn exec(agent: &ureq::Agent, list: &mut TodoList, line: &str) -> Result<(), String> {
    let command = Command::parse(line).map_err(|e| report(&e))?.expect("non-blank line");
    match handle(list, command).map_err(|e| report(&e))? {
        Step::Dispatch(out) => {
            let outcome = transport::execute(agent, out.request);
            list.complete(out.ticket, outcome).map(|_| ()).map_err(|e| format!("error: {e}"))
        }
        _ => Ok(()),
    }
}

#[test]
fn command_session_against_backend() {
    let url = start_server();
    let agent = transport::agent();
    let mut list = TodoList::new(TodoClient::new(&url));

    exec(&agent, &mut list, "reload").unwrap();
    assert_eq!(view::render(&list), "(no tasks)\n");

    exec(&agent, &mut list, "add Buy milk").unwrap();
    exec(&agent, &mut list, "add Walk dog").unwrap();
    exec(&agent, &mut list, "toggle 1").unwrap();
    assert_eq!(view::render(&list), "  1. [x] Buy milk\n  2. [ ] Walk dog\n");

    exec(&agent, &mut list, "edit 1").unwrap();
    exec(&agent, &mut list, "text Buy oat milk").unwrap();
    exec(&agent, &mut list, "save").unwrap();
    assert_eq!(view::render(&list), "  1. [x] Buy oat milk\n  2. [ ] Walk dog\n");

    let err = exec(&agent, &mut list, "add   ").unwrap_err();
    assert_eq!(err, "! Please enter a task before adding!");

    exec(&agent, &mut list, "del 2").unwrap();
    assert_eq!(list.tasks().len(), 1);

    // A second client loading the collection sees the same state.
    let mut other = TodoList::new(TodoClient::new(&url));
    exec(&agent, &mut other, "reload").unwrap();
    assert_eq!(other.tasks(), list.tasks());
}

#[test]
fn transport_passes_error_statuses_through() {
    let url = start_server();
    let agent = transport::agent();
    let client = TodoClient::new(&url);

    let response = transport::execute(&agent, client.build_delete_task(&TaskId::Number(7))).unwrap();
    assert_eq!(response.status, 404);
}
