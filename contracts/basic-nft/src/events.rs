use commons::{ApprovalEvent, APPROVAL_TAG};
use concordium_std::*;

/// Tagged collection event that is not part of CIS-2.
#[derive(Debug)]
pub enum BasicNftEvent {
    Approval(ApprovalEvent),
}

impl Serial for BasicNftEvent {
    fn serial<W: Write>(&self, out: &mut W) -> Result<(), W::Err> {
        match self {
            BasicNftEvent::Approval(event) => {
                out.write_u8(APPROVAL_TAG)?;
                event.serial(out)
            }
        }
    }
}
