use libmqtt::network::error::Error;
use libmqtt::system::scheduler::Scheduler;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Event {
    Blink,
    Sample,
    Reply,
    GiveUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ready {
    Bytes(usize),
}

fn readable(condition: &Ready, available: usize) -> bool {
    match condition {
        Ready::Bytes(n) => available >= *n,
    }
}

#[test]
fn test_deadline_tasks() {
    let mut tasks: Scheduler<Event, Ready, 4> = Scheduler::new();
    tasks.after(100, 50, Event::Blink).unwrap();

    assert_eq!(tasks.next_ready(149, |_| false), None);
    assert_eq!(tasks.next_ready(150, |_| false), Some(Event::Blink));
    assert_eq!(tasks.next_ready(1_000, |_| false), None);
    assert!(tasks.is_empty());
}

#[test]
fn test_due_tasks_fire_in_arm_order() {
    let mut tasks: Scheduler<Event, Ready, 4> = Scheduler::new();
    tasks.after(0, 20, Event::Sample).unwrap();
    tasks.after(0, 10, Event::Blink).unwrap();

    assert_eq!(tasks.next_ready(20, |_| false), Some(Event::Sample));
    assert_eq!(tasks.next_ready(20, |_| false), Some(Event::Blink));
}

#[test]
fn test_condition_tasks() {
    let mut tasks: Scheduler<Event, Ready, 4> = Scheduler::new();
    tasks.if_then(Ready::Bytes(4), Event::Reply).unwrap();

    assert_eq!(tasks.next_ready(0, |c| readable(c, 2)), None);
    assert_eq!(tasks.len(), 1);

    assert_eq!(tasks.next_ready(0, |c| readable(c, 4)), Some(Event::Reply));
    assert_eq!(tasks.next_ready(0, |c| readable(c, 4)), None);
}

#[test]
fn test_race_cancels_loser() {
    let mut tasks: Scheduler<Event, Ready, 4> = Scheduler::new();
    let reply = tasks.if_then(Ready::Bytes(1), Event::Reply).unwrap();
    let give_up = tasks.after(0, 1_000, Event::GiveUp).unwrap();
    tasks.only_one_of(reply, give_up);

    assert_eq!(tasks.next_ready(1_000, |_| false), Some(Event::GiveUp));
    assert!(!tasks.is_armed(reply));
    assert_eq!(tasks.next_ready(1_000, |_| true), None);
}

#[test]
fn test_race_won_by_condition() {
    let mut tasks: Scheduler<Event, Ready, 4> = Scheduler::new();
    let reply = tasks.if_then(Ready::Bytes(1), Event::Reply).unwrap();
    let give_up = tasks.after(0, 1_000, Event::GiveUp).unwrap();
    tasks.only_one_of(reply, give_up);
    let blink = tasks.after(0, 500, Event::Blink).unwrap();

    assert_eq!(tasks.next_ready(10, |_| true), Some(Event::Reply));
    assert!(!tasks.is_armed(give_up));
    assert!(tasks.is_armed(blink));
    assert_eq!(tasks.next_ready(5_000, |_| true), Some(Event::Blink));
}

#[test]
fn test_cancel_and_clear() {
    let mut tasks: Scheduler<Event, Ready, 4> = Scheduler::new();
    let blink = tasks.after(0, 10, Event::Blink).unwrap();
    tasks.after(0, 10, Event::Sample).unwrap();

    assert!(tasks.cancel(blink));
    assert!(!tasks.cancel(blink));
    assert_eq!(tasks.len(), 1);

    tasks.clear();
    assert!(tasks.is_empty());
    assert_eq!(tasks.next_ready(10, |_| true), None);
}

#[test]
fn test_capacity() {
    let mut tasks: Scheduler<Event, Ready, 2> = Scheduler::new();
    tasks.after(0, 1, Event::Blink).unwrap();
    tasks.after(0, 1, Event::Sample).unwrap();
    assert_eq!(
        tasks.after(0, 1, Event::GiveUp),
        Err(Error::CapacityExceeded)
    );

    // A fired task frees its slot.
    assert_eq!(tasks.next_ready(1, |_| false), Some(Event::Blink));
    assert!(tasks.if_then(Ready::Bytes(1), Event::Reply).is_ok());
}

#[test]
fn test_deadline_saturates() {
    let mut tasks: Scheduler<Event, Ready, 1> = Scheduler::new();
    tasks.after(u64::MAX - 1, 10, Event::Blink).unwrap();
    assert_eq!(tasks.next_ready(u64::MAX - 1, |_| false), None);
    assert_eq!(tasks.next_ready(u64::MAX, |_| false), Some(Event::Blink));
}
