//! Golden test vectors for canonical event ids.
//!
//! Expected ids were computed outside this codebase from the compact JSON
//! form of each vector, so they pin the encoder to the wire format rather
//! than to itself.

use nostrmart_core::{compute_event_id, EventFields, EventId, Tag};

/// A golden event-id vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Author public key (hex).
    pub pubkey: &'static str,
    /// Unix seconds.
    pub created_at: u64,
    /// Event kind.
    pub kind: u16,
    /// Tags, each a list of fields.
    pub tags: &'static [&'static [&'static str]],
    /// Event content.
    pub content: &'static str,
    /// Expected event id (hex).
    pub expected_id: &'static str,
}

impl GoldenVector {
    /// Build the vector's tags.
    pub fn tags(&self) -> Vec<Tag> {
        self.tags
            .iter()
            .map(|fields| {
                Tag::new(fields.iter().map(|s| s.to_string()).collect())
                    .expect("golden vector tags are non-empty")
            })
            .collect()
    }

    /// Compute the id with the local encoder.
    pub fn compute_id(&self) -> EventId {
        let tags = self.tags();
        compute_event_id(&EventFields {
            pubkey: self.pubkey,
            created_at: self.created_at,
            kind: self.kind,
            tags: &tags,
            content: self.content,
        })
    }
}

const PK_G: &str = "79be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";
const PK_FIATJAF: &str = "3bf0c63fcb93463407af97a5e5ee64fa883d107ef9e558472c4eb9aaaefa459d";

/// Get all golden event-id vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "empty note",
            pubkey: PK_G,
            created_at: 0,
            kind: 1,
            tags: &[],
            content: "",
            expected_id: "1d60156c7d5c3d752ed401ba085300ea90869712b4acc88edff9601de4c0b15c",
        },
        GoldenVector {
            name: "hello note",
            pubkey: PK_G,
            created_at: 1_700_000_000,
            kind: 1,
            tags: &[],
            content: "hello",
            expected_id: "bde202ea7642ff9910600c7edc948a1f4220f0cbf5e4fb2b7efafa681bbb5285",
        },
        GoldenVector {
            name: "tagged listing",
            pubkey: PK_FIATJAF,
            created_at: 1_736_870_400,
            kind: 30402,
            tags: &[
                &["d", "bike-42"],
                &["t", "market"],
                &["price", "150", "USD"],
            ],
            content: "Vintage bicycle, good condition",
            expected_id: "2f45df0da3f721bd3ae2f6b7e33e4642b1d89aaeb0c692805a913958558c4b22",
        },
        GoldenVector {
            name: "escapes and unicode",
            pubkey: PK_FIATJAF,
            created_at: 1_736_870_401,
            kind: 1,
            tags: &[&["subject", "caf\u{e9} \"quoted\""]],
            content: "line1\nline2\ttab \\ back \u{1} \u{1F680} \u{65e5}\u{672c}",
            expected_id: "81844ad3e1454eb34ac046291c3bd23eadf822ec785a3efb0f02ee2d6e3938b2",
        },
        GoldenVector {
            name: "auth event",
            pubkey: PK_G,
            created_at: 1_736_870_400,
            kind: 22242,
            tags: &[
                &["relay", "wss://relay.example"],
                &[
                    "challenge",
                    "abababababababababababababababababababababababababababababababab",
                ],
            ],
            content: "",
            expected_id: "8793869510d3fc0b119d57c175989c4f77f137b411021435efc9a95c2f7cc0f9",
        },
    ]
}

/// Known npub / hex pairs from NIP-19.
pub const NPUB_VECTORS: &[(&str, &str)] = &[
    (
        "npub10elfcs4fr0l0r8af98jlmgdh9c8tcxjvz9qkw038js35mp4dma8qzvjptg",
        "7e7e9c42a91bfef19fa929e5fda1b72e0ebc1a4c1141673e2794234d86addf4e",
    ),
    (
        "npub180cvv07tjdrrgpa0j7j7tmnyl2yr6yr7l8j4s3evf6u64th6gkwsyjh6w6",
        "3bf0c63fcb93463407af97a5e5ee64fa883d107ef9e558472c4eb9aaaefa459d",
    ),
];

/// Check every golden vector against the local encoder.
///
/// Returns `(name, matches, computed_hex)` per vector.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    all_vectors()
        .iter()
        .map(|v| {
            let hex = v.compute_id().to_hex();
            (v.name.to_string(), hex == v.expected_id, hex)
        })
        .collect()
}
