#[cfg(test)]
mod tests {
    use crate::events::{Event, EventType, LamportTime, Member, MemberEvent, MemberStatus, UserEvent};
    use std::net::{IpAddr, Ipv4Addr};

    fn localhost_member(name: &str) -> Member {
        Member::new(name, IpAddr::V4(Ipv4Addr::LOCALHOST), 9022)
    }

    #[test]
    fn test_event_type_discriminator() {
        let join = Event::MemberJoin(MemberEvent::new(vec![localhost_member("node-1")]));
        assert_eq!(join.event_type(), EventType::MemberJoin);
        assert_eq!(join.event_type().to_string(), "member-join");

        let user = Event::User(UserEvent {
            name: "serfer:deploy".to_string(),
            ..Default::default()
        });
        assert_eq!(user.event_type(), EventType::User);
        assert_eq!(user.event_type().to_string(), "user");
    }

    #[test]
    fn test_unknown_event_type_display() {
        assert_eq!(EventType::Unknown(-1).to_string(), "unknown-event--1");
        assert_eq!(EventType::Unknown(42).to_string(), "unknown-event-42");
    }

    #[test]
    fn test_member_defaults() {
        let member = localhost_member("node-1");
        assert_eq!(member.status, MemberStatus::Alive);
        assert!(member.tags.is_empty());
        assert_eq!(member.port, 9022);
    }

    #[test]
    fn test_reap_marker_code() {
        assert_eq!(MemberStatus::Reaped.code(), -1);
        assert_eq!(MemberStatus::Alive.code(), 1);
        assert_eq!(MemberStatus::Failed.to_string(), "failed");
    }

    #[test]
    fn test_member_event_json_form() {
        let json = r#"{
            "type": "member-failed",
            "members": [
                { "name": "node-2", "addr": "10.0.0.2", "port": 7946, "status": "failed" }
            ]
        }"#;

        let event: Event = serde_json::from_str(json).unwrap();
        match event {
            Event::MemberFailed(payload) => {
                assert_eq!(payload.members.len(), 1);
                assert_eq!(payload.members[0].name, "node-2");
                assert_eq!(payload.members[0].status, MemberStatus::Failed);
                assert_eq!(payload.members[0].addr, "10.0.0.2".parse::<IpAddr>().unwrap());
            }
            other => panic!("expected member-failed, got {other:?}"),
        }
    }

    #[test]
    fn test_user_event_json_form_defaults() {
        let event: Event = serde_json::from_str(r#"{"type":"user","name":"serfer:deploy"}"#).unwrap();
        assert_eq!(
            event,
            Event::User(UserEvent {
                ltime: LamportTime(0),
                name: "serfer:deploy".to_string(),
                payload: Vec::new(),
                coalesce: false,
            })
        );
    }

    #[test]
    fn test_unrecognized_json_form() {
        let event: Event = serde_json::from_str(r#"{"type":"unrecognized","code":99}"#).unwrap();
        assert_eq!(event.event_type(), EventType::Unknown(99));
    }

    #[test]
    fn test_unknown_type_tag_is_rejected() {
        let result = serde_json::from_str::<Event>(r#"{"type":"member-teleport","members":[]}"#);
        assert!(result.is_err());
    }
}
