//! UID generation for TS6-style user identifiers.

use rand::Rng;

/// Unique identifier for a session (TS6 UID string).
pub type Uid = String;

/// Generates UIDs for our own pseudo-clients.
///
/// Format: SID (3 chars) + client ID (6 chars base36) = 9 chars total.
/// `AAAAAA` is the service pseudo-client itself; placeholders get random
/// client IDs so a restarted node does not walk into UIDs the network
/// still remembers from the previous run.
pub struct UidGenerator {
    sid: String,
}

impl UidGenerator {
    pub fn new(sid: String) -> Self {
        Self { sid }
    }

    /// UID of the service pseudo-client.
    pub fn service_uid(&self) -> Uid {
        format!("{}{}", self.sid, base36_encode_6(0))
    }

    /// Random UID that `in_use` does not claim, trying at most `max_attempts`
    /// candidates.
    pub fn allocate(&self, max_attempts: usize, in_use: impl Fn(&str) -> bool) -> Option<Uid> {
        let mut rng = rand::thread_rng();
        // 36^6; skip 0 which is the service itself
        const SPACE: u64 = 2_176_782_336;
        for _ in 0..max_attempts {
            let uid = format!("{}{}", self.sid, base36_encode_6(rng.gen_range(1..SPACE)));
            if !in_use(&uid) {
                return Some(uid);
            }
        }
        None
    }
}

/// Encode a number as a 6-character base36 string.
fn base36_encode_6(mut n: u64) -> String {
    const CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    let mut result = [b'A'; 6];

    for i in (0..6).rev() {
        result[i] = CHARS[(n % 36) as usize];
        n /= 36;
    }

    String::from_utf8_lossy(&result).into_owned()
}
