//! Proptest generators for property-based testing.

use proptest::prelude::*;

use nostrmart_core::{Event, EventBuilder, Keypair, PublicKey, Tag};

/// Generate a random keypair.
pub fn keypair() -> impl Strategy<Value = Keypair> {
    any::<[u8; 32]>().prop_filter_map("invalid secret key", |secret| {
        Keypair::from_secret_bytes(&secret).ok()
    })
}

/// Generate 32 arbitrary key bytes. Not necessarily a curve point.
pub fn public_key_bytes() -> impl Strategy<Value = PublicKey> {
    any::<[u8; 32]>().prop_map(PublicKey::from_bytes)
}

/// Generate a plausible timestamp.
pub fn timestamp() -> impl Strategy<Value = u64> {
    0u64..=4_102_444_800
}

/// Generate an event kind.
pub fn kind() -> impl Strategy<Value = u16> {
    prop_oneof![Just(1u16), Just(22242u16), Just(24242u16), any::<u16>()]
}

/// Generate a tag string, including characters that need escaping.
pub fn tag_field() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z]{1,8}".prop_map(String::from),
        "[0-9a-f]{64}".prop_map(String::from),
        any::<String>(),
    ]
}

/// Generate a non-empty tag.
pub fn tag() -> impl Strategy<Value = Tag> {
    prop::collection::vec(tag_field(), 1..=4)
        .prop_map(|fields| Tag::new(fields).expect("non-empty"))
}

/// Generate event content up to `max_len` characters.
pub fn content(max_len: usize) -> impl Strategy<Value = String> {
    prop::collection::vec(any::<char>(), 0..=max_len).prop_map(|c| c.into_iter().collect())
}

/// Parameters for generating a signed event.
#[derive(Debug, Clone)]
pub struct EventParams {
    pub keypair: Keypair,
    pub created_at: u64,
    pub kind: u16,
    pub tags: Vec<Tag>,
    pub content: String,
}

impl Arbitrary for EventParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            keypair(),
            timestamp(),
            kind(),
            prop::collection::vec(tag(), 0..6),
            content(200),
        )
            .prop_map(|(keypair, created_at, kind, tags, content)| EventParams {
                keypair,
                created_at,
                kind,
                tags,
                content,
            })
            .boxed()
    }
}

/// Build and sign an event from parameters.
pub fn event_from_params(params: &EventParams) -> Event {
    params
        .tags
        .iter()
        .cloned()
        .fold(EventBuilder::new(params.kind), EventBuilder::tag)
        .created_at(params.created_at)
        .content(params.content.clone())
        .sign(&params.keypair)
}
