use bytemuck::{Pod, Zeroable};
use codec_common::ProtobufMessageHeader;

pub type MessageHeader = ProtobufMessageHeader<Command>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(i32)]
pub enum Command {
    Invalid = 0,
    Handshake = 1, // Reserved for RPC handshake
    // Application-specific commands start from 16
    AllocateS3Chunk = 16,
}

#[allow(clippy::derivable_impls)]
impl Default for Command {
    fn default() -> Self {
        Command::Invalid
    }
}

// Safety: Command is defined as enum type (i32), and 0 as Invalid. With
// header checksum validation we can also be sure no invalid enum value is
// being interpreted.
unsafe impl Pod for Command {}
unsafe impl Zeroable for Command {}
