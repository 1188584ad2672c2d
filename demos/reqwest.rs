//! Follows an event stream for a while, printing what arrives.
//!
//! `cargo run --example reqwest --features reqwest -- http://127.0.0.1:8080/events`

use std::time::Duration;

use sselink::{
    EventSource,
    source::{EventSourceConfig, Notification, Phase, listener},
};

#[tokio::main]
async fn main() {
    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "http://127.0.0.1:8080/events".to_owned());

    let source = EventSource::new(
        reqwest::Client::new(),
        url,
        EventSourceConfig::new().with_retry(Duration::from_secs(2)),
    );

    source.set_on_open(Some(listener(|_| println!("connected"))));
    source.set_on_error(Some(listener(|notification| {
        if let Notification::Error(err) = notification {
            eprintln!("error: {err}");
        }
    })));
    source.set_on_message(Some(listener(|notification| {
        if let Notification::Message(message) = notification {
            println!("{} (id {:?})", &*message.data, message.id.as_deref());
        }
    })));
    source.set_on_retry_change(Some(std::sync::Arc::new(|retry: Duration| {
        println!("server asked for {retry:?} between reconnects")
    })));

    let closer = source.closer();
    source.add_event_listener(
        "shutdown",
        listener(move |_| closer.close()),
        Phase::Bubble,
    );

    source.start();
    tokio::time::sleep(Duration::from_secs(30)).await;
    println!("done after {:?}, state {:?}", Duration::from_secs(30), source.ready_state());
}
