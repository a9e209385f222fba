//! # Example: calendar_item
//!
//! Coordinates three independent loaders for a calendar detail screen.
//!
//! Shows how to:
//! - Use gate places (capacity 1, one initial token) that hand their token back.
//! - Join two facts with an auto-fire transition.
//! - Drive the net from async tasks through a [`Dispatcher`].
//! - Observe fires with the built-in [`LogWriter`].
//!
//! ## Net
//! ```text
//! item_gate(1) ──► item_loaded ──► item_gate
//!
//! sub_gate(1)  ──► subscription_loaded ──► sub_gate, done
//! pay_gate(1)  ──► payment_updated     ──► pay_gate, done
//!
//! done x2 ──► enable_switch (auto) ──► done x1
//! ```
//!
//! The switch is enabled once both the subscription and the payment state
//! are known, and again after every later update of either.
//!
//! ## Run
//! ```bash
//! cargo run --example calendar_item --features logging
//! ```

use std::sync::Arc;
use std::time::Duration;

use petrinet::{Config, Dispatcher, LogWriter, PetriNet, Place, Subscribe, Transition};

#[derive(Debug, Clone, Default)]
struct Item {
    title: String,
    starts_free_trial: bool,
}

#[derive(Debug, Clone, Copy, Default)]
struct PaymentState {
    purchased: bool,
    in_trial: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut b = PetriNet::builder(Config::default());

    let item_gate = b.place(Place::new("waiting_for_item").with_capacity(1).with_tokens(1))?;
    let sub_gate = b.place(
        Place::new("waiting_for_subscription")
            .with_capacity(1)
            .with_tokens(1),
    )?;
    let pay_gate = b.place(Place::new("waiting_for_payment").with_capacity(1).with_tokens(1))?;
    let done = b.place(Place::new("done"))?;

    let item_loaded = b.transition(
        Transition::<Item>::new("item_loaded")
            .input(item_gate, 1)
            .output(item_gate, 1)
            .action(|item: Item| {
                println!("[ui] title={:?} trial={}", item.title, item.starts_free_trial);
            }),
    )?;
    let subscription_loaded = b.transition(
        Transition::<Option<u64>>::new("subscription_loaded")
            .input(sub_gate, 1)
            .output(sub_gate, 1)
            .output(done, 1)
            .action(|id: Option<u64>| match id {
                Some(id) => println!("[ui] subscribed, id={id}"),
                None => println!("[ui] not subscribed"),
            }),
    )?;
    let payment_updated = b.transition(
        Transition::<PaymentState>::new("payment_updated")
            .input(pay_gate, 1)
            .output(pay_gate, 1)
            .output(done, 1)
            .action(|state: PaymentState| {
                println!(
                    "[ui] payment purchased={} in_trial={}",
                    state.purchased, state.in_trial
                );
            }),
    )?;
    b.transition(
        Transition::<()>::new("enable_switch")
            .input(done, 2)
            .output(done, 1)
            .action(|()| println!("[ui] switch enabled"))
            .auto_fire(),
    )?;

    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let dispatcher = Dispatcher::spawn(b.build(), subs);

    let loaders = vec![
        tokio::spawn({
            let h = dispatcher.handle();
            async move {
                tokio::time::sleep(Duration::from_millis(30)).await;
                let item = Item {
                    title: "Public holidays".into(),
                    starts_free_trial: true,
                };
                h.fire(item_loaded, item).await
            }
        }),
        tokio::spawn({
            let h = dispatcher.handle();
            async move {
                tokio::time::sleep(Duration::from_millis(10)).await;
                h.fire(subscription_loaded, Some(7)).await
            }
        }),
        tokio::spawn({
            let h = dispatcher.handle();
            async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                let state = PaymentState {
                    purchased: false,
                    in_trial: true,
                };
                h.fire(payment_updated, state).await
            }
        }),
    ];
    for loader in loaders {
        let fired = loader.await??;
        println!("[main] {fired:?}");
    }

    // A later payment change re-enables the switch once more.
    let fired = dispatcher
        .handle()
        .fire(
            payment_updated,
            PaymentState {
                purchased: true,
                in_trial: false,
            },
        )
        .await?;
    println!("[main] {fired:?}");

    let net = dispatcher.shutdown().await?;
    println!("[main] final marking: {:?}", net.marking().as_slice());
    Ok(())
}
