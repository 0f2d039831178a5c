use std::collections::HashMap;

use bounded_integer::BoundedU8;
use fixed_map::Map;
use serde::{Deserialize, Serialize};
use strum_macros::AsRefStr;
use tracing::{debug, trace};

use crate::event_file::error::ReplayError;
use crate::event_file::event_data::{Advance, EventData, EventKind};
use crate::event_file::misc::{
    Annotations, Count, EventRecord, Hand, PitcherResponsibilityAdjustment, RunnerAdjustment,
    StartRecord, SubstitutionRecord,
};
use crate::event_file::play::parse;
use crate::event_file::traits::{
    Batter, BaseRunner, Catcher, FieldingPosition, Inning, LineupPosition, Matchup, Pitcher,
    Player, Side,
};

pub type Outs = BoundedU8<0, 3>;

/// Whoever stands in one of the four occupant slots, along with the pitcher and
/// catcher who will be charged if they score.
#[derive(Debug, Eq, PartialEq, Copy, Clone, Default, Serialize)]
pub struct BaseOccupant {
    pub runner: Option<Player>,
    pub pitcher: Option<Pitcher>,
    pub catcher: Option<Catcher>,
    pub event_index: usize,
    pub automatic: bool,
}

impl BaseOccupant {
    pub const fn is_occupied(&self) -> bool {
        self.runner.is_some()
    }
}

pub type BaseState = [BaseOccupant; 4];

#[derive(Debug, Ord, PartialOrd, Eq, PartialEq, Clone, Copy, Serialize, Deserialize, AsRefStr)]
pub enum EnteredGameAs {
    Starter,
    PinchHitter,
    PinchRunner,
    DefensiveSubstitution,
}

impl EnteredGameAs {
    const fn substitution_type(sub: &SubstitutionRecord) -> Self {
        match sub.fielding_position {
            FieldingPosition::PinchHitter => Self::PinchHitter,
            FieldingPosition::PinchRunner => Self::PinchRunner,
            _ => Self::DefensiveSubstitution,
        }
    }
}

/// One player's stay in a lineup slot. Position changes while in the slot
/// update the entry in place; a new player starts a new entry.
#[derive(Debug, Eq, PartialEq, Clone, Serialize)]
pub struct LineupEntry {
    pub player: Player,
    pub name: String,
    pub position: FieldingPosition,
    pub entered_game_as: EnteredGameAs,
    pub start_event: usize,
    pub end_event: Option<usize>,
    /// Entered as a pinch hitter or runner for the designated hitter and
    /// has not yet been given a position.
    pub for_dh: bool,
}

/// Everyone who has occupied a batting slot, in order of appearance.
#[derive(Debug, Eq, PartialEq, Clone, Default, Serialize)]
pub struct LineupSlot {
    entries: Vec<LineupEntry>,
}

impl LineupSlot {
    pub fn current(&self) -> Option<&LineupEntry> {
        self.entries.last().filter(|e| e.end_event.is_none())
    }

    fn current_mut(&mut self) -> Option<&mut LineupEntry> {
        self.entries.last_mut().filter(|e| e.end_event.is_none())
    }

    pub fn starter(&self) -> Option<&LineupEntry> {
        self.entries
            .first()
            .filter(|e| e.entered_game_as == EnteredGameAs::Starter)
    }

    pub fn history(&self) -> &[LineupEntry] {
        &self.entries
    }

    /// The occupant of the slot when the event with this index was played.
    pub fn at_event(&self, event_index: usize) -> Option<&LineupEntry> {
        self.entries.iter().rev().find(|e| {
            e.start_event <= event_index && e.end_event.map_or(true, |end| end > event_index)
        })
    }

    fn push(&mut self, entry: LineupEntry) {
        if let Some(current) = self.current_mut() {
            current.end_event = Some(entry.start_event);
        }
        self.entries.push(entry);
    }

    fn vacate(&mut self, event_index: usize) {
        if let Some(current) = self.current_mut() {
            current.end_event = Some(event_index);
        }
    }
}

/// Batting order and defensive alignment of one team.
#[derive(Debug, Eq, PartialEq, Clone, Default, Serialize)]
pub struct Lineup {
    slots: [LineupSlot; 10],
    defense: Map<FieldingPosition, Player>,
    has_dh: bool,
    next_up: LineupPosition,
}

impl Lineup {
    pub const fn slot(&self, position: LineupPosition) -> &LineupSlot {
        &self.slots[position.index()]
    }

    fn slot_mut(&mut self, position: LineupPosition) -> &mut LineupSlot {
        &mut self.slots[position.index()]
    }

    pub fn fielder(&self, position: FieldingPosition) -> Option<Player> {
        self.defense.get(position).copied()
    }

    pub const fn has_dh(&self) -> bool {
        self.has_dh
    }

    pub const fn next_up(&self) -> LineupPosition {
        self.next_up
    }

    /// Batting slot currently held by `player`. A pitcher who also bats
    /// appears in slot 0 and a batting slot, so the batting slots come first.
    pub fn batting_slot(&self, player: Player) -> Option<LineupPosition> {
        (1..10_u8)
            .chain(0..1)
            .filter_map(|i| LineupPosition::try_from(i).ok())
            .find(|lp| self.slot(*lp).current().map(|e| e.player) == Some(player))
    }

    fn fielding_position(&self, player: Player) -> Option<FieldingPosition> {
        self.defense
            .iter()
            .find_map(|(pos, p)| (*p == player).then_some(pos))
    }

    fn set_fielder(&mut self, position: FieldingPosition, player: Player) {
        if let Some(old) = self.fielding_position(player) {
            self.defense.remove(old);
        }
        self.defense.insert(position, player);
    }

    fn revoke_dh(&mut self, event_index: usize) {
        debug!("Designated hitter revoked at event {}", event_index);
        self.has_dh = false;
        self.slot_mut(LineupPosition::PitcherWithDh).vacate(event_index);
        self.defense.remove(FieldingPosition::DesignatedHitter);
    }

    /// Pinch hitters and runners for the designated hitter become the DH once
    /// their half-inning is over.
    fn promote_dh_substitutes(&mut self) {
        let promoted = self.slots.iter_mut().find_map(|slot| {
            let entry = slot.current_mut().filter(|e| e.for_dh)?;
            entry.for_dh = false;
            if entry.position.is_pinch() {
                entry.position = FieldingPosition::DesignatedHitter;
                Some(entry.player)
            } else {
                None
            }
        });
        if let Some(player) = promoted {
            self.set_fielder(FieldingPosition::DesignatedHitter, player);
        }
    }
}

/// This tracks unusual elements of the current plate appearance,
/// such as batters batting from an unexpected side or a substitution in the middle of
/// an at-bat.
#[derive(Default, Debug, Eq, PartialEq, Clone, Copy, Serialize)]
pub struct RareAttributes {
    pub batter_hand: Option<Hand>,
    pub pitcher_hand: Option<Hand>,
    // The credit for a strikeout or walk completed by a substitute cannot be
    // decided until the plate appearance ends, so the replaced player is
    // remembered here.
    pub strikeout_responsible_batter: Option<Batter>,
    pub walk_responsible_pitcher: Option<Pitcher>,
}

#[derive(Debug, Eq, PartialEq, Clone, Copy, Default, Serialize)]
pub struct PitcherRuns {
    pub runs: u16,
    pub earned_runs: u16,
}

#[derive(Debug, Eq, PartialEq, Clone, Copy, Serialize)]
pub struct RunScored {
    pub runner: Player,
    pub origin: BaseRunner,
    pub advance: Advance,
    pub rbi: bool,
    pub responsible_pitcher: Option<Pitcher>,
    pub responsible_catcher: Option<Catcher>,
}

/// What applying one event record did.
#[derive(Debug, Eq, PartialEq, Clone, Serialize)]
pub struct EventOutcome {
    pub event: EventData,
    pub event_index: usize,
    pub inning: Inning,
    pub batting_side: Side,
    pub batter: Batter,
    pub charged_batter: Batter,
    pub charged_pitcher: Option<Pitcher>,
    /// Occupants at the start of the play, after responsibility on
    /// fielder's choices has been handed on.
    pub occupants: BaseState,
    pub runs: Vec<RunScored>,
}

#[derive(Debug, Eq, PartialEq, Clone, Serialize)]
pub struct GameSummary {
    pub game_id: String,
    pub score: Matchup<u16>,
    pub hits: Matchup<u16>,
    pub errors: Matchup<u16>,
    pub left_on_base: Matchup<u16>,
    pub game_winning_rbi: Option<Player>,
}

/// Everything needed to interpret the next event of a game.
#[derive(Debug, Eq, PartialEq, Clone, Serialize)]
pub struct GameState {
    game_id: String,
    event_index: usize,
    inning: Inning,
    batting_side: Side,
    outs: Outs,
    count: Count,
    bases: BaseState,
    lineups: Matchup<Lineup>,
    score: Matchup<u16>,
    hits: Matchup<u16>,
    errors: Matchup<u16>,
    left_on_base: Matchup<u16>,
    inning_batters: u8,
    inning_runs: u8,
    unusual_state: RareAttributes,
    go_ahead_rbi: Matchup<Option<Player>>,
    pitcher_runs: HashMap<Player, PitcherRuns>,
}

impl GameState {
    pub fn new(game_id: &str, starters: &[StartRecord]) -> Self {
        let mut lineups: Matchup<Lineup> = Matchup::default();
        for start in starters {
            let lineup = lineups.get_mut(start.side);
            lineup.slot_mut(start.lineup_position).push(LineupEntry {
                player: start.player,
                name: start.name.clone(),
                position: start.fielding_position,
                entered_game_as: EnteredGameAs::Starter,
                start_event: 0,
                end_event: None,
                for_dh: false,
            });
            if start.fielding_position.is_true_position() {
                lineup.set_fielder(start.fielding_position, start.player);
            }
            if start.fielding_position == FieldingPosition::DesignatedHitter
                || start.lineup_position == LineupPosition::PitcherWithDh
            {
                lineup.has_dh = true;
            }
        }
        Self {
            game_id: game_id.to_string(),
            event_index: 0,
            inning: 1,
            batting_side: Side::Away,
            outs: Outs::MIN,
            count: Count::default(),
            bases: BaseState::default(),
            lineups,
            score: Matchup::default(),
            hits: Matchup::default(),
            errors: Matchup::default(),
            left_on_base: Matchup::default(),
            inning_batters: 0,
            inning_runs: 0,
            unusual_state: RareAttributes::default(),
            go_ahead_rbi: Matchup::default(),
            pitcher_runs: HashMap::with_capacity(10),
        }
    }

    /// Back to the start of the game with a fresh set of starters.
    pub fn reset(&mut self, starters: &[StartRecord]) {
        *self = Self::new(&self.game_id, starters);
    }

    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    pub const fn event_index(&self) -> usize {
        self.event_index
    }

    pub const fn inning(&self) -> Inning {
        self.inning
    }

    pub const fn batting_side(&self) -> Side {
        self.batting_side
    }

    pub fn outs(&self) -> u8 {
        self.outs.get()
    }

    pub const fn bases(&self) -> &BaseState {
        &self.bases
    }

    pub const fn base(&self, runner: BaseRunner) -> &BaseOccupant {
        &self.bases[runner.index()]
    }

    pub const fn lineup(&self, side: Side) -> &Lineup {
        self.lineups.get(side)
    }

    pub const fn score(&self, side: Side) -> u16 {
        *self.score.get(side)
    }

    pub const fn hits(&self, side: Side) -> u16 {
        *self.hits.get(side)
    }

    pub const fn errors(&self, side: Side) -> u16 {
        *self.errors.get(side)
    }

    pub const fn left_on_base(&self, side: Side) -> u16 {
        *self.left_on_base.get(side)
    }

    pub const fn inning_batters(&self) -> u8 {
        self.inning_batters
    }

    pub const fn inning_runs(&self) -> u8 {
        self.inning_runs
    }

    pub const fn unusual_state(&self) -> &RareAttributes {
        &self.unusual_state
    }

    pub fn fielder(&self, side: Side, position: FieldingPosition) -> Result<Player, ReplayError> {
        self.lineups
            .get(side)
            .fielder(position)
            .ok_or(ReplayError::NoFielder { side, position })
    }

    pub fn pitcher(&self, side: Side) -> Result<Pitcher, ReplayError> {
        self.fielder(side, FieldingPosition::Pitcher)
    }

    pub fn catcher(&self, side: Side) -> Result<Catcher, ReplayError> {
        self.fielder(side, FieldingPosition::Catcher)
    }

    pub fn batter_slot(&self, side: Side, player: Player) -> Option<LineupPosition> {
        self.lineups.get(side).batting_slot(player)
    }

    pub fn pitcher_runs(&self, pitcher: Player) -> PitcherRuns {
        self.pitcher_runs.get(&pitcher).copied().unwrap_or_default()
    }

    /// The batter who drove in the run that gave the eventual winner a lead it
    /// never gave up, or `None` for a tie or a lead taken without an RBI.
    pub fn game_winning_rbi(&self) -> Option<Player> {
        match self.score.away.cmp(&self.score.home) {
            std::cmp::Ordering::Greater => self.go_ahead_rbi.away,
            std::cmp::Ordering::Less => self.go_ahead_rbi.home,
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn summary(&self) -> GameSummary {
        GameSummary {
            game_id: self.game_id.clone(),
            score: self.score,
            hits: self.hits,
            errors: self.errors,
            left_on_base: self.left_on_base,
            game_winning_rbi: self.game_winning_rbi(),
        }
    }

    /// Applies one event record. Nothing changes unless the whole record
    /// applies cleanly.
    pub fn apply(&mut self, record: &EventRecord) -> Result<EventOutcome, ReplayError> {
        let event = parse(&record.play.play).map_err(|source| ReplayError::Parse {
            game_id: self.game_id.clone(),
            inning: record.play.inning,
            event_index: self.event_index,
            batter: record.play.batter.to_string(),
            source,
        })?;
        let mut next = self.clone();
        let outcome = next.apply_event(record, event)?;
        *self = next;
        Ok(outcome)
    }

    /// Applies everything attached to a record whose play can't be parsed:
    /// the side change, annotations and substitutions. Atomic like [`Self::apply`].
    pub fn apply_skipped(&mut self, record: &EventRecord) -> Result<(), ReplayError> {
        let mut next = self.clone();
        let play = &record.play;
        if play.inning != next.inning || play.batting_side != next.batting_side {
            next.change_sides(play.inning, play.batting_side);
        }
        next.apply_annotations(&record.annotations)?;
        next.unusual_state.batter_hand = None;
        next.unusual_state.pitcher_hand = None;
        next.event_index += 1;
        for sub in &record.substitutions {
            next.apply_substitution(sub)?;
        }
        *self = next;
        Ok(())
    }

    fn apply_event(
        &mut self,
        record: &EventRecord,
        event: EventData,
    ) -> Result<EventOutcome, ReplayError> {
        let play = &record.play;
        if play.inning != self.inning || play.batting_side != self.batting_side {
            self.change_sides(play.inning, play.batting_side);
        }
        self.apply_annotations(&record.annotations)?;
        debug!(
            "{} {} {:?}: {} {}",
            self.game_id, self.inning, self.batting_side, play.batter, play.play
        );

        let side = self.batting_side;
        let defense = side.flip();
        let batter_event = event.event_kind.is_batter_event();
        let batter_slot = self.lineups.get(side).batting_slot(play.batter);
        if batter_event && batter_slot.is_none() {
            return Err(ReplayError::BatterNotInLineup {
                side,
                player: play.batter.to_string(),
            });
        }

        let charged_batter = match self.unusual_state.strikeout_responsible_batter {
            Some(b) if event.event_kind == EventKind::Strikeout => b,
            _ => play.batter,
        };
        let current_pitcher = self.lineups.get(defense).fielder(FieldingPosition::Pitcher);
        let current_catcher = self.lineups.get(defense).fielder(FieldingPosition::Catcher);
        let charged_pitcher = match self.unusual_state.walk_responsible_pitcher {
            Some(p) if event.event_kind.is_walk() => Some(p),
            _ => current_pitcher,
        };
        self.bases[0] = BaseOccupant {
            runner: Some(play.batter),
            pitcher: charged_pitcher,
            catcher: current_catcher,
            event_index: self.event_index,
            automatic: false,
        };

        let new_outs = usize::from(self.outs.get()) + event.num_outs();
        self.outs = u8::try_from(new_outs)
            .ok()
            .and_then(Outs::new)
            .ok_or(ReplayError::TooManyOuts)?;

        for runner in [BaseRunner::Third, BaseRunner::Second, BaseRunner::First] {
            let i = runner.index();
            if event.fc_flag[i] && event.out_flag[i] && self.bases[i].is_occupied() {
                let carried = (self.bases[i].pitcher, self.bases[i].catcher);
                hand_on_responsibility(&mut self.bases, i, carried);
            }
        }
        let occupants = self.bases;
        let runs = self.move_runners(&event)?;
        self.record_runs(&runs, play.batter);

        if event.event_kind.is_hit() {
            *self.hits.get_mut(side) += 1;
        }
        let errors = u16::try_from(event.errors.len()).unwrap_or(u16::MAX);
        *self.errors.get_mut(defense) += errors;

        if batter_event {
            self.inning_batters = self.inning_batters.saturating_add(1);
            if let Some(slot) = batter_slot {
                self.lineups.get_mut(side).next_up = slot.next();
            }
            self.unusual_state = RareAttributes::default();
            self.count = Count::default();
        } else {
            self.unusual_state.batter_hand = None;
            self.unusual_state.pitcher_hand = None;
            self.count = play.count;
        }

        let outcome = EventOutcome {
            event,
            event_index: self.event_index,
            inning: self.inning,
            batting_side: side,
            batter: play.batter,
            charged_batter,
            charged_pitcher,
            occupants,
            runs,
        };
        self.bases[0] = BaseOccupant::default();
        self.event_index += 1;

        for sub in &record.substitutions {
            self.apply_substitution(sub)?;
        }
        Ok(outcome)
    }

    fn apply_annotations(&mut self, annotations: &Annotations) -> Result<(), ReplayError> {
        if let Some(adj) = annotations.batter_hand {
            self.unusual_state.batter_hand = Some(adj.hand);
        }
        if let Some(adj) = annotations.pitcher_hand {
            self.unusual_state.pitcher_hand = Some(adj.hand);
        }
        if let Some(adj) = annotations.lineup {
            self.lineups.get_mut(adj.side).next_up = adj.lineup_position;
        }
        if let Some(adj) = annotations.automatic_runner {
            self.place_automatic_runner(adj)?;
        }
        for adj in &annotations.pitcher_responsibility {
            self.adjust_pitcher_responsibility(*adj)?;
        }
        Ok(())
    }

    fn place_automatic_runner(&mut self, adj: RunnerAdjustment) -> Result<(), ReplayError> {
        if adj.base == BaseRunner::Batter {
            return Err(ReplayError::InvalidAutomaticRunnerBase(adj.base));
        }
        let occupant = &mut self.bases[adj.base.index()];
        if occupant.is_occupied() {
            return Err(ReplayError::BaseOccupied(adj.base));
        }
        let defense = self.lineups.get(self.batting_side.flip());
        *occupant = BaseOccupant {
            runner: Some(adj.runner),
            pitcher: defense.fielder(FieldingPosition::Pitcher),
            catcher: defense.fielder(FieldingPosition::Catcher),
            event_index: self.event_index,
            automatic: true,
        };
        trace!("Automatic runner {} placed on {:?}", adj.runner, adj.base);
        Ok(())
    }

    fn adjust_pitcher_responsibility(
        &mut self,
        adj: PitcherResponsibilityAdjustment,
    ) -> Result<(), ReplayError> {
        let occupant = &mut self.bases[adj.base.index()];
        if !occupant.is_occupied() {
            return Err(ReplayError::NoRunner(adj.base));
        }
        occupant.pitcher = Some(adj.pitcher);
        Ok(())
    }

    /// Moves every occupant to its destination. Runners moving back a base are
    /// placed after everyone else so they never land on a runner who hasn't
    /// left yet.
    fn move_runners(&mut self, event: &EventData) -> Result<Vec<RunScored>, ReplayError> {
        let old = self.bases;
        let mut new = BaseState::default();
        let mut runs = Vec::with_capacity(4);
        let mut backward = Vec::with_capacity(1);

        for runner in [
            BaseRunner::Third,
            BaseRunner::Second,
            BaseRunner::First,
            BaseRunner::Batter,
        ] {
            let i = runner.index();
            let advance = event.advance_of(runner);
            let out = event.is_out(runner);
            if !old[i].is_occupied() {
                if out || advance != Advance::None {
                    return Err(ReplayError::NoRunner(runner));
                }
                continue;
            }
            if out {
                trace!("{:?} out", runner);
                continue;
            }
            if advance.scored() {
                let occupant = old[i];
                runs.push(RunScored {
                    runner: occupant.runner.unwrap_or_default(),
                    origin: runner,
                    advance: if occupant.automatic {
                        Advance::ScoredAutomatic
                    } else {
                        advance
                    },
                    rbi: event.rbi_credited(runner),
                    responsible_pitcher: occupant.pitcher,
                    responsible_catcher: occupant.catcher,
                });
                continue;
            }
            let target = match advance.base_runner() {
                Some(target) => target,
                // The batter has no base to stay on.
                None if runner == BaseRunner::Batter => continue,
                None => runner,
            };
            if target < runner {
                backward.push((runner, target));
            } else {
                place(&mut new, target, old[i])?;
            }
        }
        for (runner, target) in backward {
            trace!("{:?} moves back to {:?}", runner, target);
            place(&mut new, target, old[runner.index()])?;
        }
        self.bases = new;
        Ok(runs)
    }

    fn record_runs(&mut self, runs: &[RunScored], batter: Batter) {
        let side = self.batting_side;
        for run in runs {
            let before = *self.score.get(side);
            let opponent = *self.score.get(side.flip());
            *self.score.get_mut(side) += 1;
            self.inning_runs = self.inning_runs.saturating_add(1);
            if before <= opponent && before + 1 > opponent {
                *self.go_ahead_rbi.get_mut(side) = run.rbi.then_some(batter);
            }
            if let Some(pitcher) = run.responsible_pitcher {
                let tally = self.pitcher_runs.entry(pitcher).or_default();
                tally.runs += 1;
                if run.advance.earned_for_pitcher() {
                    tally.earned_runs += 1;
                }
            }
        }
    }

    /// Ends the current half-inning and starts the next one.
    pub fn change_sides(&mut self, inning: Inning, batting_side: Side) {
        self.strand_runners();
        debug!(
            "{}: side change to {} {:?} with {} outs",
            self.game_id,
            inning,
            batting_side,
            self.outs.get()
        );
        self.bases = BaseState::default();
        self.outs = Outs::MIN;
        self.inning_batters = 0;
        self.inning_runs = 0;
        self.count = Count::default();
        self.unusual_state = RareAttributes::default();
        self.lineups.away.promote_dh_substitutes();
        self.lineups.home.promote_dh_substitutes();
        self.inning = inning;
        self.batting_side = batting_side;
    }

    /// Closes out the last half-inning once the game's records run out.
    pub fn finish(&mut self) {
        self.strand_runners();
    }

    fn strand_runners(&mut self) {
        let stranded = self.bases[1..].iter().filter(|b| b.is_occupied()).count();
        *self.left_on_base.get_mut(self.batting_side) +=
            u16::try_from(stranded).unwrap_or_default();
        self.bases = BaseState::default();
    }

    pub fn apply_substitution(&mut self, sub: &SubstitutionRecord) -> Result<(), ReplayError> {
        let side = sub.side;
        let event_index = self.event_index;

        if side == self.batting_side
            && sub.lineup_position == self.lineups.get(side).next_up
            && self.count.is_old_batter_responsible_strikeout()
            && self.unusual_state.strikeout_responsible_batter.is_none()
        {
            self.unusual_state.strikeout_responsible_batter = self
                .lineups
                .get(side)
                .slot(sub.lineup_position)
                .current()
                .map(|e| e.player);
        } else if sub.fielding_position == FieldingPosition::Pitcher
            && side != self.batting_side
            && self.count.is_old_pitcher_responsible_walk()
            && self.unusual_state.walk_responsible_pitcher.is_none()
        {
            self.unusual_state.walk_responsible_pitcher =
                self.lineups.get(side).fielder(FieldingPosition::Pitcher);
        }

        let replaced = self
            .lineups
            .get(side)
            .slot(sub.lineup_position)
            .current()
            .cloned();

        if sub.fielding_position == FieldingPosition::PinchRunner {
            let replaced = replaced.as_ref().ok_or(ReplayError::EmptyLineupSlot {
                side,
                slot: sub.lineup_position,
            })?;
            if replaced.player != sub.player {
                let occupant = self.bases[1..]
                    .iter_mut()
                    .find(|b| b.runner == Some(replaced.player))
                    .ok_or_else(|| ReplayError::RunnerNotOnBase {
                        player: sub.player.to_string(),
                        replaced: replaced.player.to_string(),
                    })?;
                occupant.runner = Some(sub.player);
            }
        }

        let lineup = self.lineups.get_mut(side);
        let batting_for_dh = replaced.as_ref().map_or(false, |c| {
            c.player == sub.player
                && (c.position == FieldingPosition::DesignatedHitter || c.for_dh)
        });

        // The DH taking the field ends the DH for the rest of the game.
        if lineup.has_dh && sub.fielding_position.is_defensive() && batting_for_dh {
            lineup.revoke_dh(event_index);
        }
        // So does the pitcher taking a spot in the batting order.
        if lineup.has_dh
            && sub.fielding_position == FieldingPosition::Pitcher
            && sub.lineup_position != LineupPosition::PitcherWithDh
        {
            lineup.revoke_dh(event_index);
        }

        match replaced {
            Some(current) if current.player == sub.player => {
                if let Some(entry) = lineup.slot_mut(sub.lineup_position).current_mut() {
                    entry.position = sub.fielding_position;
                    entry.for_dh = entry.for_dh && sub.fielding_position.is_pinch();
                }
            }
            current => {
                let for_dh = sub.fielding_position.is_pinch()
                    && current.map_or(false, |c| {
                        c.position == FieldingPosition::DesignatedHitter || c.for_dh
                    });
                lineup.slot_mut(sub.lineup_position).push(LineupEntry {
                    player: sub.player,
                    name: sub.name.clone(),
                    position: sub.fielding_position,
                    entered_game_as: EnteredGameAs::substitution_type(sub),
                    start_event: event_index,
                    end_event: None,
                    for_dh,
                });
            }
        }
        if sub.fielding_position.is_true_position() {
            lineup.set_fielder(sub.fielding_position, sub.player);
        }
        debug!(
            "{}: {} enters for {:?} at {:?}, batting {:?}",
            self.game_id, sub.player, side, sub.fielding_position, sub.lineup_position
        );
        Ok(())
    }
}

fn place(bases: &mut BaseState, target: BaseRunner, occupant: BaseOccupant) -> Result<(), ReplayError> {
    let slot = &mut bases[target.index()];
    if slot.is_occupied() {
        return Err(ReplayError::BaseOccupied(target));
    }
    *slot = occupant;
    Ok(())
}

/// Rule 9.16(g): a runner forced out on a fielder's choice leaves their pitcher
/// and catcher charged with the nearest trailing runner, whose own pair moves
/// on down in turn until it reaches the batter.
fn hand_on_responsibility(
    bases: &mut BaseState,
    vacated: usize,
    carried: (Option<Pitcher>, Option<Catcher>),
) {
    let target = (1..vacated)
        .rev()
        .find(|i| bases[*i].is_occupied())
        .unwrap_or(0);
    let displaced = (bases[target].pitcher, bases[target].catcher);
    bases[target].pitcher = carried.0;
    bases[target].catcher = carried.1;
    trace!("Responsibility from base {} handed to slot {}", vacated, target);
    if target > 0 {
        hand_on_responsibility(bases, target, displaced);
    }
}
