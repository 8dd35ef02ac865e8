use hubbub::{
    Component, Gadget, HandlerRef, Hub, SubscribeOptions, Subscribed,
    testing::{FailingHandler, RecordingHandler},
};

mod common;
use common::{Args, active_hub};

fn remembered() -> SubscribeOptions<Args> {
    SubscribeOptions::new().with_memory(true)
}

#[tokio::test]
async fn test_late_memory_subscriber_gets_last_publish_once() {
    let (hub, gadget) = active_hub::<Args>("late");
    hub.publish("foo", (true, "first")).await.unwrap();
    hub.publish("foo", (true, "last")).await.unwrap();

    let recorder = RecordingHandler::<Args>::new();
    let handler = HandlerRef::new(recorder.clone());
    let replay = hub
        .subscribe("foo", &handler, &gadget, remembered())
        .into_replay()
        .expect("remembered publish should replay");

    // The handler already ran inside subscribe; awaiting yields the outcome.
    assert_eq!(recorder.args(), vec![(true, "last")]);
    assert!(replay.is_finished());
    let outcome = replay.await;
    assert!(outcome.is_ok());
    assert_eq!(outcome.context, gadget.id());

    assert!(hub.subscribe("foo", &handler, &gadget, remembered()).is_duplicate());
    assert_eq!(recorder.args(), vec![(true, "last")]);
}

#[tokio::test]
async fn test_dropped_replay_still_delivers() {
    let (hub, gadget) = active_hub::<Args>("careless");
    hub.publish("foo", (true, "bar")).await.unwrap();

    let recorder = RecordingHandler::<Args>::new();
    let _ = hub.subscribe("foo", &HandlerRef::new(recorder.clone()), &gadget, remembered());

    assert_eq!(recorder.args(), vec![(true, "bar")]);
    assert_eq!(hub.subscriber_count("foo"), 1);
}

#[tokio::test]
async fn test_replay_respects_predicate() {
    let (hub, gadget) = active_hub::<Args>("picky");
    hub.publish("foo", (false, "bar")).await.unwrap();

    let recorder = RecordingHandler::<Args>::new();
    let subscribed = hub.subscribe(
        "foo",
        &HandlerRef::new(recorder.clone()),
        &gadget,
        remembered().with_predicate(|args: &Args| args.0),
    );

    assert!(matches!(subscribed, Subscribed::Added));
    assert_eq!(recorder.count(), 0);
}

#[tokio::test]
async fn test_replay_requires_active_context() {
    let hub = Hub::<Args>::new();
    let gadget = Gadget::named("dormant");
    hub.publish("foo", (true, "bar")).await.unwrap();

    let subscribed = hub.subscribe(
        "foo",
        &HandlerRef::new(RecordingHandler::<Args>::new()),
        &gadget,
        remembered(),
    );

    assert!(matches!(subscribed, Subscribed::Added));
}

#[tokio::test]
async fn test_plain_subscription_never_replays() {
    let (hub, gadget) = active_hub::<Args>("plain");
    hub.publish("foo", (true, "bar")).await.unwrap();

    let subscribed = hub.subscribe(
        "foo",
        &HandlerRef::new(RecordingHandler::<Args>::new()),
        &gadget,
        SubscribeOptions::new(),
    );

    assert!(matches!(subscribed, Subscribed::Added));
}

#[tokio::test]
async fn test_nothing_to_replay_on_fresh_topic() {
    let (hub, gadget) = active_hub::<Args>("fresh");

    let subscribed = hub.subscribe(
        "foo",
        &HandlerRef::new(RecordingHandler::<Args>::new()),
        &gadget,
        remembered(),
    );

    assert!(subscribed.into_replay().is_none());
}

#[tokio::test]
async fn test_replay_failure_is_reported() {
    let (hub, gadget) = active_hub::<Args>("broken");
    hub.publish("foo", (true, "bar")).await.unwrap();

    let failing = FailingHandler::error("cannot replay");
    let outcome = hub
        .subscribe("foo", &HandlerRef::new(failing.clone()), &gadget, remembered())
        .into_replay()
        .expect("remembered publish should replay")
        .await;

    let failure = outcome.failure().expect("replay should fail");
    assert_eq!(failure.topic, "foo");
    assert_eq!(failure.kind.to_string(), "cannot replay");
    assert_eq!(failing.calls(), 1);
}

#[tokio::test]
async fn test_component_memory_declaration_replays_on_start() {
    let hub = Hub::<(String, String)>::new();
    let remembered = RecordingHandler::<(String, String)>::new();
    let plain = RecordingHandler::<(String, String)>::new();
    let mut component = Component::new("memo")
        .declare("hub/foo/bar(true)", remembered.clone())
        .unwrap()
        .declare("hub/foo/bar", plain.clone())
        .unwrap();

    hub.publish("foo/bar", ("foo".to_string(), "bar".to_string()))
        .await
        .unwrap();
    let outcomes = component.start(&hub).await.unwrap();

    assert_eq!(outcomes.len(), 1);
    assert!(outcomes[0].is_ok());
    assert_eq!(
        remembered.args(),
        vec![("foo".to_string(), "bar".to_string())]
    );
    assert_eq!(plain.count(), 0);
}
