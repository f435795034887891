//! Placement engine - picks a landing for the active piece and drives a session to it
//!
//! Used by the headless runner and by anything else that wants a session to play
//! itself. It only talks to the session through intents, so a planned placement obeys
//! the same collision and kick rules as a player would.

pub mod place;

pub use blockfall_types as types;

pub use place::{
    apply_placement, board_features, intents_for, place_best, plan, plan_session,
    BoardFeatures, IntentPlan, PlaceError, Placement,
};
