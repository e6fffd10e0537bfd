//! Collective behavior: village formation, culture, and governance.
//!
//! Everything here is emergent in the sense that no operation creates
//! social structure directly. The engines scan what agents have already
//! done (relationships built, events logged) and crystallize villages,
//! traditions, and leaders out of those traces.
//!
//! - [`VillageEngine`] walks the trust graph and founds or expands
//!   settlements around mutually trusting clusters.
//! - [`CultureEngine`] mines the event log for recurring activities and
//!   classifies each village's dominant cultural style.
//! - [`GovernanceEngine`] runs leader elections, goal votes, and the
//!   communal resource pool.

mod culture;
mod error;
mod governance;
mod village;

pub use culture::{
    detect_traditions, dominant_style, historical_importance, is_regular, CultureEngine,
    CultureReport,
};
pub use error::SocietyError;
pub use governance::{leadership_aptitude, GovernanceEngine};
pub use village::{average_trust, trust_clusters, FormationReport, VillageEngine};
