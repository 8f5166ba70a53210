use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use agora_shared::{VoteDirection, VoteTarget};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, HtmlElement};

use crate::api::{CsrfSource, FetchTransport, MetaCsrf, VoteError, VoteTransport};
use crate::util;

/// How long the direction-keyed color emphasis stays on the button.
pub const VOTE_FLASH_MS: u32 = 800;
/// The error flash is deliberately shorter.
pub const ERROR_FLASH_MS: u32 = 500;
/// Scale pop on the score display after a confirmed vote.
pub const SCORE_POP_MS: u32 = 200;

const UPVOTE_COLOR: &str = "#10b981";
const DOWNVOTE_COLOR: &str = "#ef4444";
const ERROR_COLOR: &str = "#ef4444";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    Upvote,
    Downvote,
    Error,
}

impl Feedback {
    fn confirming(direction: VoteDirection) -> Self {
        match direction {
            VoteDirection::Upvote => Feedback::Upvote,
            VoteDirection::Downvote => Feedback::Downvote,
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Feedback::Upvote => UPVOTE_COLOR,
            Feedback::Downvote => DOWNVOTE_COLOR,
            Feedback::Error => ERROR_COLOR,
        }
    }

    pub fn revert_ms(self) -> u32 {
        match self {
            Feedback::Error => ERROR_FLASH_MS,
            _ => VOTE_FLASH_MS,
        }
    }
}

/// UI handle for the triggering control. Injected so the pipeline can
/// be exercised without a DOM.
pub trait VoteControl {
    /// Transient pressed affordance, applied before the request goes out.
    fn press(&self);
    /// Reverts the pressed affordance. Runs on every outcome.
    fn release(&self);
    /// Updates the score display to the server-confirmed value.
    fn show_score(&self, score: i64);
    /// Brief color emphasis, reverting after `feedback.revert_ms()`.
    fn flash(&self, feedback: Feedback);
}

/// At most one outstanding request per target. Rapid repeated clicks on
/// the same control are dropped instead of racing each other.
#[derive(Default)]
pub struct InFlight {
    busy: RefCell<HashSet<VoteTarget>>,
}

impl InFlight {
    pub fn acquire(&self, target: &VoteTarget) -> Option<InFlightGuard<'_>> {
        if !self.busy.borrow_mut().insert(target.clone()) {
            return None;
        }
        Some(InFlightGuard {
            registry: self,
            target: target.clone(),
        })
    }
}

pub struct InFlightGuard<'a> {
    registry: &'a InFlight,
    target: VoteTarget,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.registry.busy.borrow_mut().remove(&self.target);
    }
}

/// Optimistic vote controller: immediate pressed feedback, one request
/// per click, then reconcile the displayed score with whatever the
/// server says.
pub struct VoteInteraction<T, S> {
    transport: T,
    csrf: S,
    in_flight: InFlight,
}

impl<T: VoteTransport, S: CsrfSource> VoteInteraction<T, S> {
    pub fn new(transport: T, csrf: S) -> Self {
        VoteInteraction {
            transport,
            csrf,
            in_flight: InFlight::default(),
        }
    }

    /// Submits one vote. All UI effects go through `control`; nothing is
    /// surfaced to the caller. Transport, protocol, parse, and rejection
    /// failures collapse into the same error flash, with the specific
    /// cause logged at debug level.
    pub async fn submit(
        &self,
        post_id: &str,
        comment_id: &str,
        direction: VoteDirection,
        control: &impl VoteControl,
    ) {
        let target = match VoteTarget::new(post_id, comment_id) {
            Ok(t) => t,
            Err(_) => {
                log::warn!(
                    "{}; post_id={post_id:?} comment_id={comment_id:?}",
                    VoteError::MissingId
                );
                return;
            }
        };

        let Some(_guard) = self.in_flight.acquire(&target) else {
            log::debug!("vote for {target} already in flight, ignoring click");
            return;
        };

        control.press();
        let csrf = self.csrf.token();
        let result = self
            .transport
            .post_vote(&target.endpoint(direction), csrf.as_ref())
            .await;
        // The pressed affordance always comes off, whatever happened.
        control.release();

        match result {
            Ok(outcome) => {
                if let Some(score) = outcome.score {
                    control.show_score(score);
                }
                control.flash(Feedback::confirming(direction));
            }
            Err(e) => {
                log::debug!("vote for {target} failed: {e}");
                control.flash(Feedback::Error);
            }
        }
    }
}

/// `VoteControl` over the real button element and the sibling
/// `.comment-score` display.
pub struct DomVoteControl {
    button: HtmlElement,
    score: Option<HtmlElement>,
}

impl DomVoteControl {
    pub fn attach(button: HtmlElement) -> Self {
        let score = button
            .parent_element()
            .and_then(|p| p.query_selector(".comment-score").ok().flatten())
            .and_then(|el| el.dyn_into::<HtmlElement>().ok());
        DomVoteControl { button, score }
    }
}

impl VoteControl for DomVoteControl {
    fn press(&self) {
        let style = self.button.style();
        let _ = style.set_property("transition", "all 0.15s ease");
        let _ = style.set_property("transform", "scale(0.9)");
    }

    fn release(&self) {
        let _ = self.button.style().set_property("transform", "scale(1)");
    }

    fn show_score(&self, score: i64) {
        let Some(el) = &self.score else { return };
        let style = el.style();
        let _ = style.set_property("transition", "transform 0.2s ease");
        let _ = style.set_property("transform", "scale(1.1)");
        el.set_text_content(Some(&score.to_string()));

        let el = el.clone();
        util::after(SCORE_POP_MS, move || {
            let _ = el.style().set_property("transform", "scale(1)");
        });
    }

    fn flash(&self, feedback: Feedback) {
        let style = self.button.style();
        let prior = style.get_property_value("color").unwrap_or_default();
        let _ = style.set_property("color", feedback.color());

        // An error revert clears the inline color outright; a confirmed
        // vote restores whatever was set before the flash.
        let restored = if feedback == Feedback::Error {
            String::new()
        } else {
            prior
        };
        let button = self.button.clone();
        util::after(feedback.revert_ms(), move || {
            let style = button.style();
            if restored.is_empty() {
                let _ = style.remove_property("color");
            } else {
                let _ = style.set_property("color", &restored);
            }
        });
    }
}

/// Document-level click delegation for `.comment-vote-btn`. The buttons
/// are server-rendered and can be swapped by later page updates, so the
/// listener lives on the document.
pub fn bind(document: &Document, interaction: Rc<VoteInteraction<FetchTransport, MetaCsrf>>) {
    util::listen(document, "click", move |event| {
        let Some(button) = util::closest(&event, ".comment-vote-btn") else {
            return;
        };
        event.prevent_default();

        let post_id = button.get_attribute("data-post-id").unwrap_or_default();
        let comment_id = button.get_attribute("data-comment-id").unwrap_or_default();
        let direction = button
            .get_attribute("data-vote-type")
            .and_then(|v| VoteDirection::parse(&v));

        let Some(direction) = direction else {
            log::warn!("vote button without a usable data-vote-type");
            return;
        };
        let Ok(button) = button.dyn_into::<HtmlElement>() else {
            return;
        };

        let control = DomVoteControl::attach(button);
        let interaction = interaction.clone();
        spawn_local(async move {
            interaction
                .submit(&post_id, &comment_id, direction, &control)
                .await;
        });
    });
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use agora_shared::VoteOutcome;
    use futures::channel::oneshot;
    use futures::executor::block_on;

    use super::*;
    use crate::api::{CsrfToken, DEFAULT_CSRF_HEADER};

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Effect {
        Press,
        Release,
        Score(i64),
        Flash(Feedback),
    }

    #[derive(Default)]
    struct RecordingControl {
        effects: RefCell<Vec<Effect>>,
    }

    impl RecordingControl {
        fn effects(&self) -> Vec<Effect> {
            self.effects.borrow().clone()
        }
    }

    impl VoteControl for RecordingControl {
        fn press(&self) {
            self.effects.borrow_mut().push(Effect::Press);
        }
        fn release(&self) {
            self.effects.borrow_mut().push(Effect::Release);
        }
        fn show_score(&self, score: i64) {
            self.effects.borrow_mut().push(Effect::Score(score));
        }
        fn flash(&self, feedback: Feedback) {
            self.effects.borrow_mut().push(Effect::Flash(feedback));
        }
    }

    struct MockTransport {
        calls: RefCell<Vec<(String, Option<CsrfToken>)>>,
        reply: Box<dyn Fn() -> Result<VoteOutcome, VoteError>>,
    }

    impl MockTransport {
        fn replying(reply: impl Fn() -> Result<VoteOutcome, VoteError> + 'static) -> Self {
            MockTransport {
                calls: RefCell::new(Vec::new()),
                reply: Box::new(reply),
            }
        }
    }

    impl VoteTransport for MockTransport {
        async fn post_vote(
            &self,
            path: &str,
            csrf: Option<&CsrfToken>,
        ) -> Result<VoteOutcome, VoteError> {
            self.calls
                .borrow_mut()
                .push((path.to_string(), csrf.cloned()));
            (self.reply)()
        }
    }

    struct FixedCsrf(Option<CsrfToken>);

    impl CsrfSource for FixedCsrf {
        fn token(&self) -> Option<CsrfToken> {
            self.0.clone()
        }
    }

    fn token() -> CsrfToken {
        CsrfToken {
            header_name: DEFAULT_CSRF_HEADER.to_string(),
            value: "tok".to_string(),
        }
    }

    fn accepted(score: i64) -> Result<VoteOutcome, VoteError> {
        Ok(VoteOutcome {
            success: true,
            score: Some(score),
        })
    }

    #[test]
    fn one_request_per_valid_triple_with_token() {
        let interaction = VoteInteraction::new(
            MockTransport::replying(|| accepted(1)),
            FixedCsrf(Some(token())),
        );
        let control = RecordingControl::default();

        block_on(interaction.submit("12", "34", VoteDirection::Upvote, &control));

        let calls = interaction.transport.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "/posts/12/comments/34/upvote");
        assert_eq!(calls[0].1, Some(token()));
    }

    #[test]
    fn missing_ids_never_reach_the_transport() {
        let interaction =
            VoteInteraction::new(MockTransport::replying(|| accepted(1)), FixedCsrf(None));
        let control = RecordingControl::default();

        block_on(interaction.submit("", "34", VoteDirection::Upvote, &control));
        block_on(interaction.submit("12", "  ", VoteDirection::Downvote, &control));

        assert!(interaction.transport.calls.borrow().is_empty());
        assert!(control.effects().is_empty());
    }

    #[test]
    fn confirmed_vote_updates_score_then_flashes_direction() {
        let interaction =
            VoteInteraction::new(MockTransport::replying(|| accepted(7)), FixedCsrf(None));
        let control = RecordingControl::default();

        block_on(interaction.submit("12", "34", VoteDirection::Downvote, &control));

        assert_eq!(
            control.effects(),
            vec![
                Effect::Press,
                Effect::Release,
                Effect::Score(7),
                Effect::Flash(Feedback::Downvote),
            ]
        );
    }

    #[test]
    fn rejection_flashes_error_and_leaves_score_alone() {
        let interaction = VoteInteraction::new(
            MockTransport::replying(|| Err(VoteError::Rejected)),
            FixedCsrf(None),
        );
        let control = RecordingControl::default();

        block_on(interaction.submit("12", "34", VoteDirection::Upvote, &control));

        assert_eq!(
            control.effects(),
            vec![
                Effect::Press,
                Effect::Release,
                Effect::Flash(Feedback::Error),
            ]
        );
    }

    #[test]
    fn network_failure_looks_identical_to_rejection() {
        let interaction = VoteInteraction::new(
            MockTransport::replying(|| Err(VoteError::Network("connection reset".into()))),
            FixedCsrf(None),
        );
        let control = RecordingControl::default();

        block_on(interaction.submit("12", "34", VoteDirection::Upvote, &control));

        assert_eq!(
            control.effects(),
            vec![
                Effect::Press,
                Effect::Release,
                Effect::Flash(Feedback::Error),
            ]
        );
    }

    #[test]
    fn release_follows_press_on_every_branch() {
        let replies: Vec<Box<dyn Fn() -> Result<VoteOutcome, VoteError>>> = vec![
            Box::new(|| accepted(3)),
            Box::new(|| Err(VoteError::Rejected)),
            Box::new(|| Err(VoteError::Status(500))),
            Box::new(|| Err(VoteError::Malformed("not json".into()))),
            Box::new(|| Err(VoteError::Network("timeout".into()))),
        ];

        for reply in replies {
            let interaction = VoteInteraction::new(
                MockTransport {
                    calls: RefCell::new(Vec::new()),
                    reply,
                },
                FixedCsrf(None),
            );
            let control = RecordingControl::default();
            block_on(interaction.submit("1", "2", VoteDirection::Upvote, &control));

            let effects = control.effects();
            assert_eq!(effects[0], Effect::Press);
            assert_eq!(effects[1], Effect::Release);
        }
    }

    #[test]
    fn in_flight_guard_blocks_duplicates_until_dropped() {
        let registry = InFlight::default();
        let target = VoteTarget::new("1", "2").unwrap();
        let other = VoteTarget::new("1", "3").unwrap();

        let guard = registry.acquire(&target).expect("first acquire");
        assert!(registry.acquire(&target).is_none());
        // A different comment is unaffected.
        assert!(registry.acquire(&other).is_some());

        drop(guard);
        assert!(registry.acquire(&target).is_some());
    }

    struct GatedTransport {
        calls: RefCell<u32>,
        gate: RefCell<Option<oneshot::Receiver<()>>>,
    }

    impl VoteTransport for GatedTransport {
        async fn post_vote(
            &self,
            _path: &str,
            _csrf: Option<&CsrfToken>,
        ) -> Result<VoteOutcome, VoteError> {
            *self.calls.borrow_mut() += 1;
            let gate = self.gate.borrow_mut().take();
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            accepted(1)
        }
    }

    #[test]
    fn second_click_is_dropped_while_first_is_outstanding() {
        let (open, gate) = oneshot::channel();
        let interaction = VoteInteraction::new(
            GatedTransport {
                calls: RefCell::new(0),
                gate: RefCell::new(Some(gate)),
            },
            FixedCsrf(None),
        );
        let first = RecordingControl::default();
        let second = RecordingControl::default();

        block_on(async {
            // join! polls left to right: the first submit parks on the
            // gate, the second sees the target busy and bails, then the
            // gate opens and the first completes.
            futures::join!(
                interaction.submit("1", "2", VoteDirection::Upvote, &first),
                async {
                    interaction.submit("1", "2", VoteDirection::Upvote, &second).await;
                    let _ = open.send(());
                }
            );
        });

        assert_eq!(*interaction.transport.calls.borrow(), 1);
        assert!(second.effects().is_empty());
        assert_eq!(first.effects().last(), Some(&Effect::Flash(Feedback::Upvote)));
    }

    #[test]
    fn flash_delays_are_keyed_to_outcome() {
        assert_eq!(Feedback::Upvote.revert_ms(), VOTE_FLASH_MS);
        assert_eq!(Feedback::Downvote.revert_ms(), VOTE_FLASH_MS);
        assert_eq!(Feedback::Error.revert_ms(), ERROR_FLASH_MS);
        assert_ne!(Feedback::Upvote.color(), Feedback::Downvote.color());
    }
}
