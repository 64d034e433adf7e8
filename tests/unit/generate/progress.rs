use super::*;

#[test]
fn messages_rotate_every_three_seconds() {
    assert_eq!(loading_message(Duration::ZERO), LOADING_MESSAGES[0]);
    assert_eq!(loading_message(Duration::from_millis(2_999)), LOADING_MESSAGES[0]);
    assert_eq!(loading_message(Duration::from_secs(3)), LOADING_MESSAGES[1]);
    assert_eq!(loading_message(Duration::from_secs(16)), LOADING_MESSAGES[5]);
}

#[test]
fn messages_wrap_around() {
    assert_eq!(loading_message(Duration::from_secs(18)), LOADING_MESSAGES[0]);
    assert_eq!(loading_message(Duration::from_secs(3 * 6 * 100 + 7)), LOADING_MESSAGES[2]);
}
