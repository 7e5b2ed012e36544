use crate::command::EppCommand;
use crate::extensions::CommandKind;
use crate::xml::XmlElement;

/// `<poll op="req"/>`: fetch the oldest queued message without removing it.
pub fn request() -> EppCommand {
    EppCommand::new(
        CommandKind::PollRequest,
        XmlElement::new("poll").with_attr("op", "req"),
    )
}

/// `<poll op="ack" msgID="..."/>`: dequeue a message.
pub fn acknowledge(message_id: &str) -> EppCommand {
    EppCommand::new(
        CommandKind::PollAck,
        XmlElement::new("poll")
            .with_attr("op", "ack")
            .with_attr("msgID", message_id),
    )
}
