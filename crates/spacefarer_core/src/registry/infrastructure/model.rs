//! Records handled by the registry.
//!
//! Ranks and departments are reference data: the hooks only read them. A
//! spacefarer travels through the pipeline either as a [`SpacefarerDraft`]
//! (create payload, optional fields filled in by the hooks), as a
//! [`SpacefarerPatch`] (update payload, only the changed fields) or as a stored
//! [`Spacefarer`].
use std::fmt;

pub type SpacefarerId = u32;
pub type RankId = u32;
pub type DepartmentId = u32;

/// Wormhole navigation skill granted by the basic training.
pub const BASIC_WORMHOLE_NAVIGATION_SKILL: u32 = 1;

/// Kind of reference record a spacefarer points to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    Rank,
    Department,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceKind::Rank => write!(f, "Rank"),
            ReferenceKind::Department => write!(f, "Department"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rank {
    pub id: RankId,
    pub title: String,
    pub required_stardust: i64,
}

impl Rank {
    pub fn new(id: RankId, title: impl Into<String>, required_stardust: i64) -> Self {
        Self { id, title: title.into(), required_stardust }
    }

    /// Whether the given amount of stardust is enough to hold this rank.
    pub fn is_eligible(&self, collected_stardust: i64) -> bool {
        self.required_stardust <= collected_stardust
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Department {
    pub id: DepartmentId,
    pub name: String,
    pub galaxy: Option<String>,
}

impl Department {
    pub fn new(id: DepartmentId, name: impl Into<String>) -> Self {
        Self { id, name: name.into(), galaxy: None }
    }

    pub fn with_galaxy(self, galaxy: impl Into<String>) -> Self {
        Self { galaxy: Some(galaxy.into()), ..self }
    }
}

/// Create payload for a spacefarer.
///
/// `id`, `rank_id` and `wormhole_navigation_skill` may be left empty: the
/// registry assigns an identifier and the create hook fills in the rank and
/// the skill.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpacefarerDraft {
    pub id: Option<SpacefarerId>,
    pub name: String,
    pub email: String,
    pub collected_stardust: i64,
    pub rank_id: Option<RankId>,
    pub department_id: Option<DepartmentId>,
    pub wormhole_navigation_skill: Option<u32>,
    pub origin_planet: Option<String>,
    pub spacesuit_color: Option<String>,
    pub mission_status: Option<String>,
}

impl SpacefarerDraft {
    pub fn new(name: impl Into<String>, email: impl Into<String>, collected_stardust: i64) -> Self {
        Self { name: name.into(), email: email.into(), collected_stardust, ..Default::default() }
    }

    pub fn with_id(self, id: SpacefarerId) -> Self {
        Self { id: Some(id), ..self }
    }

    pub fn with_rank(self, rank_id: RankId) -> Self {
        Self { rank_id: Some(rank_id), ..self }
    }

    pub fn with_department(self, department_id: DepartmentId) -> Self {
        Self { department_id: Some(department_id), ..self }
    }

    pub fn with_wormhole_navigation_skill(self, skill: u32) -> Self {
        Self { wormhole_navigation_skill: Some(skill), ..self }
    }

    pub fn with_origin_planet(self, origin_planet: impl Into<String>) -> Self {
        Self { origin_planet: Some(origin_planet.into()), ..self }
    }

    pub fn with_spacesuit_color(self, spacesuit_color: impl Into<String>) -> Self {
        Self { spacesuit_color: Some(spacesuit_color.into()), ..self }
    }

    pub fn with_mission_status(self, mission_status: impl Into<String>) -> Self {
        Self { mission_status: Some(mission_status.into()), ..self }
    }
}

/// Update payload for a spacefarer, `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpacefarerPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub collected_stardust: Option<i64>,
    pub rank_id: Option<RankId>,
    pub department_id: Option<DepartmentId>,
    pub wormhole_navigation_skill: Option<u32>,
    pub origin_planet: Option<String>,
    pub spacesuit_color: Option<String>,
    pub mission_status: Option<String>,
}

/// Stored spacefarer record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spacefarer {
    pub id: SpacefarerId,
    pub name: String,
    pub email: String,
    pub collected_stardust: i64,
    pub rank_id: Option<RankId>,
    pub department_id: Option<DepartmentId>,
    pub wormhole_navigation_skill: Option<u32>,
    pub origin_planet: Option<String>,
    pub spacesuit_color: Option<String>,
    pub mission_status: Option<String>,
}

impl Spacefarer {
    /// Builds the stored record from a validated draft.
    pub fn from_draft(id: SpacefarerId, draft: SpacefarerDraft) -> Self {
        Self {
            id,
            name: draft.name,
            email: draft.email,
            collected_stardust: draft.collected_stardust,
            rank_id: draft.rank_id,
            department_id: draft.department_id,
            wormhole_navigation_skill: draft.wormhole_navigation_skill,
            origin_planet: draft.origin_planet,
            spacesuit_color: draft.spacesuit_color,
            mission_status: draft.mission_status,
        }
    }

    pub fn apply(&mut self, patch: SpacefarerPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(collected_stardust) = patch.collected_stardust {
            self.collected_stardust = collected_stardust;
        }
        if patch.rank_id.is_some() {
            self.rank_id = patch.rank_id;
        }
        if patch.department_id.is_some() {
            self.department_id = patch.department_id;
        }
        if patch.wormhole_navigation_skill.is_some() {
            self.wormhole_navigation_skill = patch.wormhole_navigation_skill;
        }
        if patch.origin_planet.is_some() {
            self.origin_planet = patch.origin_planet;
        }
        if patch.spacesuit_color.is_some() {
            self.spacesuit_color = patch.spacesuit_color;
        }
        if patch.mission_status.is_some() {
            self.mission_status = patch.mission_status;
        }
    }
}
