use bracket_driver_api::id::{GroupId, TeamId, TournamentId};
use bracket_driver_api::tournaments::groups::AddTeamsRoute;
use bracket_driver_api::tournaments::{BracketType, Format, Tournament};
use uuid::Uuid;

use crate::{Backend, Result};

/// The resources to create for a single run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TournamentPlan {
    pub tournament: Tournament,
    pub group: String,
    pub teams: Vec<String>,
}

/// Builds [`TournamentPlan`]s with names that are unique per call.
#[derive(Clone, Debug, Default)]
pub struct TournamentGenerator {
    pub name: Option<String>,
    pub bracket_type: Option<BracketType>,
    pub teams: u32,
}

impl TournamentGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generate(&self) -> TournamentPlan {
        let bracket_type = self.bracket_type.unwrap_or_default();
        let name = self.name.clone().unwrap_or_else(|| {
            let suffix = Uuid::new_v4().simple().to_string();
            format!("LoadTest-{}-{}", bracket_type.tag(), &suffix[..8])
        });

        let teams = (1..=self.teams)
            .map(|i| format!("Team-{}-{}", i, Uuid::new_v4()))
            .collect();

        TournamentPlan {
            tournament: Tournament {
                id: None,
                name,
                format: Format {
                    max_teams_per_group: self.teams,
                    number_of_groups: 1,
                    kind: bracket_type,
                },
            },
            group: String::from("Group-A"),
            teams,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ProvisionOptions {
    pub route: AddTeamsRoute,
    /// Associate teams with one request per team instead of a single batch.
    pub one_by_one: bool,
}

/// The identifiers of a provisioned tournament.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProvisionedTournament {
    pub tournament: TournamentId,
    pub group: GroupId,
    pub teams: Vec<TeamId>,
}

#[derive(Debug)]
pub struct Provisioner<'a, B> {
    backend: &'a B,
    options: ProvisionOptions,
}

impl<'a, B> Provisioner<'a, B>
where
    B: Backend,
{
    pub fn new(backend: &'a B, options: ProvisionOptions) -> Self {
        Self { backend, options }
    }

    /// Creates the teams, the tournament and its group, and adds all teams to the group.
    ///
    /// # Errors
    ///
    /// Fails on the first failed request. Resources created before the failure are not
    /// removed.
    pub async fn provision(&self, plan: &TournamentPlan) -> Result<ProvisionedTournament> {
        let mut teams = Vec::with_capacity(plan.teams.len());
        for name in &plan.teams {
            let id = self.backend.create_team(name).await?;
            log::debug!("Created team {} ({})", name, id);
            teams.push(id);
        }

        let tournament = self.backend.create_tournament(&plan.tournament).await?;
        log::info!(
            "Created tournament {} ({}, {})",
            plan.tournament.name,
            tournament,
            plan.tournament.format.kind
        );

        let group = self.backend.create_group(&tournament, &plan.group).await?;
        log::debug!("Created group {} ({})", plan.group, group);

        if self.options.one_by_one {
            for team in &teams {
                self.backend
                    .add_teams(&tournament, &group, std::slice::from_ref(team), self.options.route)
                    .await?;
            }
        } else {
            self.backend
                .add_teams(&tournament, &group, &teams, self.options.route)
                .await?;
        }

        log::info!(
            "Tournament {}: added {} teams to group {} via {}",
            tournament,
            teams.len(),
            group,
            self.options.route
        );

        Ok(ProvisionedTournament {
            tournament,
            group,
            teams,
        })
    }
}

#[cfg(test)]
mod tests {
    use bracket_driver_api::id::TeamId;
    use bracket_driver_api::tournaments::BracketType;

    use super::{ProvisionOptions, Provisioner, TournamentGenerator};
    use crate::mock::MockBracket;

    #[test]
    fn test_generate() {
        let generator = TournamentGenerator {
            teams: 4,
            ..Default::default()
        };

        let plan = generator.generate();
        assert!(plan.tournament.name.starts_with("LoadTest-DE-"));
        assert_eq!(plan.tournament.name.len(), "LoadTest-DE-".len() + 8);
        assert_eq!(plan.tournament.format.max_teams_per_group, 4);
        assert_eq!(plan.tournament.format.number_of_groups, 1);
        assert_eq!(plan.tournament.format.kind, BracketType::DoubleElimination);
        assert_eq!(plan.group, "Group-A");
        assert_eq!(plan.teams.len(), 4);
        assert!(plan.teams[0].starts_with("Team-1-"));
        assert!(plan.teams[3].starts_with("Team-4-"));

        // Names never repeat between runs.
        let other = generator.generate();
        assert_ne!(plan.tournament.name, other.tournament.name);
        assert_ne!(plan.teams, other.teams);
    }

    #[test]
    fn test_generate_named() {
        let plan = TournamentGenerator {
            name: Some("Cup".to_owned()),
            bracket_type: Some(BracketType::SingleElimination),
            teams: 0,
        }
        .generate();

        assert_eq!(plan.tournament.name, "Cup");
        assert_eq!(plan.tournament.format.kind, BracketType::SingleElimination);
        assert!(plan.teams.is_empty());
    }

    #[test]
    fn test_generate_group_capacity() {
        let plan = TournamentGenerator {
            teams: 1000,
            ..Default::default()
        }
        .generate();

        // The group always has room for every generated team.
        assert_eq!(plan.teams.len(), 1000);
        assert_eq!(plan.tournament.format.max_teams_per_group, 1000);
    }

    #[tokio::test]
    async fn test_provision() {
        let backend = MockBracket::default();
        let plan = TournamentGenerator {
            teams: 3,
            ..Default::default()
        }
        .generate();

        let provisioned = Provisioner::new(&backend, ProvisionOptions::default())
            .provision(&plan)
            .await
            .unwrap();

        assert_eq!(provisioned.tournament, "t");
        assert_eq!(provisioned.group, "g");
        assert_eq!(
            provisioned.teams,
            [
                TeamId::from("team-1"),
                TeamId::from("team-2"),
                TeamId::from("team-3")
            ]
        );

        // Teams first, then the tournament, then the group.
        let created = backend.created.lock();
        assert_eq!(created.len(), 5);
        assert_eq!(created[..3], plan.teams[..]);
        assert_eq!(created[3], plan.tournament.name);
        assert_eq!(created[4], "Group-A");

        assert_eq!(*backend.added.lock(), [provisioned.teams.clone()]);
    }

    #[tokio::test]
    async fn test_provision_one_by_one() {
        let backend = MockBracket::default();
        let plan = TournamentGenerator {
            teams: 3,
            ..Default::default()
        }
        .generate();

        let options = ProvisionOptions {
            one_by_one: true,
            ..Default::default()
        };
        let provisioned = Provisioner::new(&backend, options)
            .provision(&plan)
            .await
            .unwrap();

        let added = backend.added.lock();
        assert_eq!(added.len(), 3);
        for (batch, team) in added.iter().zip(&provisioned.teams) {
            assert_eq!(batch, &[team.clone()]);
        }
    }
}
