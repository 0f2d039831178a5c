//! Parser for the play field of an event file record.
//!
//! The grammar is scanned left to right, one symbol at a time with a single
//! symbol of lookahead:
//!
//! ```text
//! play      := primary ('+' secondary)? (';' baserunning)* ('/' flag)* ('.' advance (';' advance)*)?
//! primary   := letters fielding-credit?
//! advance   := runner ('-' | 'X') base ('(' modifier ')')*
//! ```
//!
//! Once the grammar is satisfied, [`EventBuilder::finish`] fills in everything
//! the notation leaves implicit (default batter destinations, RBI credit,
//! batted ball type) and resolves out markers that were nullified by errors.
use std::collections::HashSet;
use std::str::FromStr;

use lazy_static::lazy_static;
use strum_macros::EnumString;
use tracing::trace;

use crate::event_file::error::{ParseError, ParseErrorKind};
use crate::event_file::event_data::{
    Advance, ErrorType, EventData, EventKind, FieldingError, Trajectory, RBI_EXPLICIT, RBI_INFERRED,
    RBI_NONE, RBI_SUPPRESSED,
};
use crate::event_file::hit_location::is_hit_location;
use crate::event_file::traits::{Base, BaseRunner, FieldingPosition};

/// Characters that carry no meaning for the parser (uncertainty and
/// exceptional-play markers, stray whitespace).
const NOISE: [char; 3] = ['#', '!', ' '];

lazy_static! {
    /// Modifiers that are accepted wherever they appear but don't change the
    /// parsed event.
    static ref NO_OP_FLAGS: HashSet<&'static str> = [
        "AP", "BINT", "BOOT", "BR", "C", "COUB", "COUF", "COUR", "FINT", "INT", "IF", "IPHR",
        "MREV", "UREV", "NDP", "OBS", "PASS", "RINT", "S", "UINT", "U", "TH",
    ]
    .into_iter()
    .collect();
}

#[derive(Debug, Eq, PartialEq, EnumString, Copy, Clone)]
enum PrimaryCode {
    #[strum(serialize = "")]
    GenericOut,
    #[strum(serialize = "S")]
    Single,
    #[strum(serialize = "D", serialize = "DGR")]
    Double,
    #[strum(serialize = "T")]
    Triple,
    #[strum(serialize = "H", serialize = "HR")]
    HomeRun,
    #[strum(serialize = "W")]
    Walk,
    #[strum(serialize = "IW", serialize = "I")]
    IntentionalWalk,
    #[strum(serialize = "HP")]
    HitByPitch,
    #[strum(serialize = "K")]
    Strikeout,
    #[strum(serialize = "KE")]
    StrikeoutError,
    #[strum(serialize = "E")]
    Error,
    #[strum(serialize = "FC")]
    FieldersChoice,
    #[strum(serialize = "FLE")]
    FoulBallError,
    #[strum(serialize = "BK")]
    Balk,
    #[strum(serialize = "C")]
    Interference,
    #[strum(serialize = "DI")]
    DefensiveIndifference,
    #[strum(serialize = "OA")]
    OtherAdvance,
    #[strum(serialize = "PB")]
    PassedBall,
    #[strum(serialize = "WP")]
    WildPitch,
    #[strum(serialize = "PO")]
    Pickoff,
    #[strum(serialize = "POCS")]
    PickoffCaughtStealing,
    #[strum(serialize = "POSB")]
    PickoffStolenBase,
    #[strum(serialize = "SB")]
    StolenBase,
    #[strum(serialize = "CS")]
    CaughtStealing,
    #[strum(serialize = "NP")]
    NoPlay,
}

/// Cursor over the symbols of a play string, with noise already removed.
/// Each symbol remembers its offset in the original text for error reporting.
struct ParserState<'a> {
    text: &'a str,
    symbols: Vec<(usize, char)>,
    pos: usize,
}

impl<'a> ParserState<'a> {
    fn new(text: &'a str) -> Self {
        let mut symbols: Vec<(usize, char)> = text
            .char_indices()
            .filter(|(_, c)| !NOISE.contains(c))
            .map(|(i, c)| (i, if c == '?' { '0' } else { c }))
            .collect();
        // A home steal written with `H` would otherwise be read as part of the
        // event code, so it is rewritten to the numeric form of home.
        for i in 2..symbols.len() {
            let window = (symbols[i - 2].1, symbols[i - 1].1, symbols[i].1);
            if matches!(window, ('S', 'B', 'H') | ('C', 'S', 'H')) {
                symbols[i].1 = '4';
            }
        }
        Self {
            text,
            symbols,
            pos: 0,
        }
    }

    fn sym(&self) -> Option<char> {
        self.symbols.get(self.pos).map(|(_, c)| *c)
    }

    fn lookahead(&self) -> Option<char> {
        self.symbols.get(self.pos + 1).map(|(_, c)| *c)
    }

    fn next_sym(&mut self) {
        self.pos += 1;
    }

    fn offset(&self) -> usize {
        self.symbols
            .get(self.pos)
            .map_or(self.text.len(), |(i, _)| *i)
    }

    fn error(&self, kind: ParseErrorKind) -> ParseError {
        ParseError {
            text: self.text.to_string(),
            position: self.offset(),
            kind,
        }
    }

    fn unexpected(&self, expected: &'static str) -> ParseError {
        self.error(ParseErrorKind::Unexpected {
            expected,
            found: self.sym(),
        })
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let mut taken = String::new();
        while let Some(c) = self.sym().filter(|c| pred(*c)) {
            taken.push(c);
            self.next_sym();
        }
        taken
    }

    fn letters(&mut self) -> String {
        self.take_while(|c| c.is_ascii_uppercase())
    }

    fn fielders(&mut self) -> Vec<FieldingPosition> {
        let mut fielders = vec![];
        while let Some(f) = self.sym().and_then(FieldingPosition::from_digit) {
            fielders.push(f);
            self.next_sym();
        }
        fielders
    }

    fn fielder(&mut self) -> Result<FieldingPosition, ParseError> {
        let f = self
            .sym()
            .and_then(FieldingPosition::from_digit)
            .ok_or_else(|| self.unexpected("fielder"))?;
        self.next_sym();
        Ok(f)
    }

    fn base(&mut self) -> Result<Base, ParseError> {
        let base = self
            .sym()
            .and_then(Base::from_char)
            .ok_or_else(|| self.unexpected("base"))?;
        self.next_sym();
        Ok(base)
    }

    /// A base that a runner can advance to, which rules out first.
    fn target_base(&mut self) -> Result<Base, ParseError> {
        match self.sym().and_then(Base::from_char) {
            Some(Base::First) | None => Err(self.unexpected("base beyond first")),
            Some(base) => {
                self.next_sym();
                Ok(base)
            }
        }
    }

    fn runner(&mut self) -> Result<BaseRunner, ParseError> {
        let runner = self
            .sym()
            .filter(|c| *c != '0')
            .and_then(BaseRunner::from_char)
            .ok_or_else(|| self.unexpected("runner"))?;
        self.next_sym();
        Ok(runner)
    }

    /// Contents of a parenthetical starting at the current `(`.
    fn parenthetical(&mut self) -> Result<String, ParseError> {
        if self.sym() != Some('(') {
            return Err(self.unexpected("'('"));
        }
        self.next_sym();
        let contents = self.take_while(|c| c != ')');
        if self.sym() != Some(')') {
            return Err(self.unexpected("')'"));
        }
        self.next_sym();
        Ok(contents)
    }

    /// An out-destination tag such as `(B)` or `(2)`, which is distinguished
    /// from other parentheticals by its single runner symbol.
    fn out_tag(&mut self) -> Option<BaseRunner> {
        if self.sym() != Some('(') {
            return None;
        }
        let runner = self.lookahead().and_then(|c| match c {
            'B' | '1' | '2' | '3' => BaseRunner::from_char(c),
            _ => None,
        })?;
        if self.symbols.get(self.pos + 2).map(|(_, c)| *c) == Some(')') {
            self.pos += 3;
            Some(runner)
        } else {
            None
        }
    }
}

/// Accumulates an [`EventData`] along with the transient facts the
/// normalization pass needs but the finished event doesn't carry.
#[derive(Debug, Default)]
struct EventBuilder {
    data: EventData,
    explicit: [bool; 4],
    out_attempt: [bool; 4],
    out_destination: [Advance; 4],
    unearned: [Option<Advance>; 4],
    implied_batter: Option<Advance>,
    default_catcher_putout: bool,
    first_out_tag: Option<BaseRunner>,
    first_chain_len: usize,
    secondary: Option<EventKind>,
    overflow: Option<&'static str>,
}

fn fielder_string(fielders: &[FieldingPosition]) -> String {
    fielders.iter().map(|f| f.digit()).collect()
}

impl EventBuilder {
    fn add_putout(&mut self, fielder: FieldingPosition) {
        if self.data.putouts.try_push(fielder).is_err() {
            self.overflow = Some("putouts");
        }
    }

    /// A fielder earns at most one assist on a play, however many times the
    /// ball passes through their hands.
    fn add_assist(&mut self, fielder: FieldingPosition) {
        if self.data.assists.contains(&fielder) {
            return;
        }
        if self.data.assists.try_push(fielder).is_err() {
            self.overflow = Some("assists");
        }
    }

    fn add_error(&mut self, fielder: FieldingPosition, error_type: ErrorType) {
        let error = FieldingError {
            fielder,
            error_type,
        };
        if self.data.errors.try_push(error).is_err() {
            self.overflow = Some("errors");
        }
    }

    fn touch(&mut self, fielder: FieldingPosition) {
        if self.data.touches.last() == Some(&fielder) {
            return;
        }
        if self.data.touches.try_push(fielder).is_err() {
            self.overflow = Some("touches");
        }
    }

    fn mark_last_error_throwing(&mut self) {
        if let Some(e) = self.data.errors.last_mut() {
            e.error_type = ErrorType::Throwing;
        }
    }

    /// Credits an out on `runner`: every fielder who threw the ball on gets an
    /// assist and the last one in the chain gets the putout.
    fn credit_out(&mut self, runner: BaseRunner, chain: &[FieldingPosition]) {
        for pair in chain.windows(2) {
            if pair[0] != pair[1] {
                self.add_assist(pair[0]);
            }
        }
        for f in chain {
            self.touch(*f);
        }
        if let Some(f) = chain.last() {
            self.add_putout(*f);
        }
        self.data.play[runner.index()] = fielder_string(chain);
    }

    /// Credits an error on a play at `runner`. Fielders whose throws preceded
    /// the error still get assists.
    fn credit_error(
        &mut self,
        runner: BaseRunner,
        chain: &[FieldingPosition],
        fielder: FieldingPosition,
        throwing: bool,
    ) {
        let receivers = chain.iter().skip(1).chain(std::iter::once(&fielder));
        for (thrower, receiver) in chain.iter().zip(receivers) {
            if thrower != receiver {
                self.add_assist(*thrower);
            }
        }
        for f in chain {
            self.touch(*f);
        }
        self.touch(fielder);
        let error_type = if throwing {
            ErrorType::Throwing
        } else if chain.last().map_or(false, |f| *f != fielder) {
            ErrorType::DroppedThrow
        } else {
            ErrorType::Fielding
        };
        self.add_error(fielder, error_type);
        self.data.play[runner.index()] = format!("{}E{}", fielder_string(chain), fielder.digit());
        if self.out_attempt[runner.index()] {
            self.data.muff_flag[runner.index()] = true;
        }
    }

    fn remove_default_catcher_putout(&mut self) {
        if !self.default_catcher_putout {
            return;
        }
        self.default_catcher_putout = false;
        if let Some(i) = self
            .data
            .putouts
            .iter()
            .position(|f| *f == FieldingPosition::Catcher)
        {
            self.data.putouts.remove(i);
        }
        if self.data.touches.first() == Some(&FieldingPosition::Catcher) {
            self.data.touches.remove(0);
        }
        self.data.play[0].clear();
    }

    fn set_advance(&mut self, runner: BaseRunner, advance: Advance) {
        if !self.explicit[runner.index()] {
            self.data.advance[runner.index()] = advance;
        }
    }

    fn attempt_out(&mut self, runner: BaseRunner, destination: Advance) {
        if !self.explicit[runner.index()] {
            self.out_attempt[runner.index()] = true;
            self.out_destination[runner.index()] = destination;
        }
    }

    /// Fills in what the notation leaves implicit.
    fn finish(mut self) -> EventData {
        self.resolve_out_attempts();
        self.resolve_fielders_choice();
        self.resolve_batter_advance();
        self.resolve_unearned_runs();
        self.resolve_dp_flags();
        self.infer_rbi();
        self.resolve_trajectory();
        self.suppress_unknown_credit();
        self.data
    }

    /// An out marker whose fielding credit includes an error means the
    /// runner was safe; without an error the runner is out.
    fn resolve_out_attempts(&mut self) {
        for i in 0..4 {
            if !self.out_attempt[i] {
                continue;
            }
            if self.data.play[i].contains('E') {
                self.data.advance[i] = self.out_destination[i];
                self.data.out_flag[i] = false;
                self.data.muff_flag[i] = true;
            } else {
                self.data.advance[i] = Advance::None;
                self.data.out_flag[i] = true;
            }
        }
    }

    /// Runners retired on a fielder's choice hand their pitcher's
    /// responsibility to a trailing runner, except when the batter was retired
    /// first on a caught ball.
    fn resolve_fielders_choice(&mut self) {
        if self.data.event_kind == EventKind::FieldersChoice {
            self.data.fc_flag[0] = true;
            for i in 1..4 {
                if self.data.out_flag[i] {
                    self.data.fc_flag[i] = true;
                }
            }
        }
        if self.first_out_tag == Some(BaseRunner::Batter) && !self.data.gdp_flag {
            for i in 1..4 {
                self.data.fc_flag[i] = false;
            }
        }
    }

    fn resolve_batter_advance(&mut self) {
        if self.explicit[0] || self.data.out_flag[0] || self.data.advance[0] != Advance::None {
            return;
        }
        let implied = self
            .implied_batter
            .unwrap_or_else(|| self.data.event_kind.implied_batter_advance());
        self.data.advance[0] = implied;
    }

    fn resolve_unearned_runs(&mut self) {
        for i in 0..4 {
            if let (Some(status), true) = (self.unearned[i], self.data.advance[i].scored()) {
                self.data.advance[i] = status;
            }
        }
    }

    fn resolve_dp_flags(&mut self) {
        match self.data.num_outs() {
            2 => self.data.dp_flag = true,
            3 => self.data.tp_flag = true,
            _ => {}
        }
    }

    /// Runs batted in: only on hits, outs that aren't double plays,
    /// fielder's choices and forced runs on free passes, and never when the
    /// runner advanced on an error.
    fn infer_rbi(&mut self) {
        let kind = self.data.event_kind;
        let eligible = match kind {
            EventKind::Single
            | EventKind::Double
            | EventKind::Triple
            | EventKind::HomeRun
            | EventKind::FieldersChoice => true,
            EventKind::GenericOut => !self.data.dp_flag,
            EventKind::Walk
            | EventKind::IntentionalWalk
            | EventKind::HitByPitch
            | EventKind::Interference => self.secondary.is_none(),
            _ => false,
        };
        let free_pass = matches!(
            kind,
            EventKind::Walk
                | EventKind::IntentionalWalk
                | EventKind::HitByPitch
                | EventKind::Interference
        );
        for i in 0..4 {
            if !self.data.advance[i].scored() || self.data.rbi_flag[i] != RBI_NONE {
                continue;
            }
            if !eligible || self.data.play[i].contains('E') {
                continue;
            }
            if free_pass && !self.is_forced_home(i) {
                continue;
            }
            self.data.rbi_flag[i] = RBI_INFERRED;
        }
        if kind == EventKind::HomeRun && self.data.rbi_flag[0] == RBI_NONE {
            self.data.rbi_flag[0] = RBI_INFERRED;
        }
        for flag in &mut self.data.rbi_flag {
            if *flag == RBI_SUPPRESSED {
                *flag = RBI_NONE;
            }
        }
    }

    /// On a free pass only the runner from third with the bases full is
    /// forced home, which shows as every trailing runner moving up one base.
    fn is_forced_home(&self, slot: usize) -> bool {
        slot == 3
            && self.data.advance[2] == Advance::Third
            && self.data.advance[1] == Advance::Second
    }

    fn resolve_trajectory(&mut self) {
        if self.data.event_kind != EventKind::GenericOut
            || self.data.batted_ball_type != Trajectory::Unknown
        {
            return;
        }
        let runner_tagged = matches!(self.first_out_tag, Some(r) if r != BaseRunner::Batter);
        self.data.batted_ball_type = if self.first_chain_len >= 2 || runner_tagged {
            Trajectory::GroundBall
        } else {
            Trajectory::Fly
        };
    }

    fn suppress_unknown_credit(&mut self) {
        if self.data.has_unknown_credit() {
            self.data.putouts.clear();
            self.data.assists.clear();
            if self.data.play[0] == "99" {
                self.data.fielded_by = FieldingPosition::Unknown;
            }
        }
    }
}

/// Parses a single play field.
pub fn parse(text: &str) -> Result<EventData, ParseError> {
    let mut st = ParserState::new(text);
    let mut builder = EventBuilder::default();

    parse_primary(&mut st, &mut builder)?;
    parse_flags(&mut st, &mut builder)?;
    if st.sym() == Some('.') {
        st.next_sym();
        parse_advancement(&mut st, &mut builder)?;
    }
    if st.sym().is_some() {
        return Err(st.unexpected("end of play"));
    }
    if let Some(list) = builder.overflow {
        return Err(st.error(ParseErrorKind::TooManyCredits(list)));
    }
    let data = builder.finish();
    trace!("Parsed {} as {:?}", text, data.event_kind);
    Ok(data)
}

impl TryFrom<&str> for EventData {
    type Error = ParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        parse(value)
    }
}

impl FromStr for EventData {
    type Err = ParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        parse(value)
    }
}

fn parse_primary(st: &mut ParserState, b: &mut EventBuilder) -> Result<(), ParseError> {
    let start = st.pos;
    let code = st.letters();
    let primary = PrimaryCode::from_str(&code).map_err(|_| {
        st.pos = start;
        st.error(ParseErrorKind::UnknownEvent(code.clone()))
    })?;
    match primary {
        PrimaryCode::GenericOut => parse_generic_out(st, b),
        PrimaryCode::Single => parse_hit(st, b, EventKind::Single),
        PrimaryCode::Double => parse_hit(st, b, EventKind::Double),
        PrimaryCode::Triple => parse_hit(st, b, EventKind::Triple),
        PrimaryCode::HomeRun => parse_hit(st, b, EventKind::HomeRun),
        PrimaryCode::Walk => parse_free_pass(st, b, EventKind::Walk),
        PrimaryCode::IntentionalWalk => parse_free_pass(st, b, EventKind::IntentionalWalk),
        PrimaryCode::HitByPitch => parse_free_pass(st, b, EventKind::HitByPitch),
        PrimaryCode::Interference => parse_free_pass(st, b, EventKind::Interference),
        PrimaryCode::Strikeout => parse_strikeout(st, b),
        PrimaryCode::StrikeoutError => parse_strikeout_error(st, b),
        PrimaryCode::Error => parse_error(st, b),
        PrimaryCode::FieldersChoice => parse_fielders_choice(st, b),
        PrimaryCode::FoulBallError => parse_foul_error(st, b),
        PrimaryCode::Balk => {
            b.data.event_kind = EventKind::Balk;
            Ok(())
        }
        PrimaryCode::DefensiveIndifference => {
            b.data.event_kind = EventKind::DefensiveIndifference;
            Ok(())
        }
        PrimaryCode::OtherAdvance => {
            b.data.event_kind = EventKind::OtherAdvance;
            Ok(())
        }
        PrimaryCode::PassedBall => {
            b.data.event_kind = EventKind::PassedBall;
            b.data.pb_flag = true;
            Ok(())
        }
        PrimaryCode::WildPitch => {
            b.data.event_kind = EventKind::WildPitch;
            b.data.wp_flag = true;
            Ok(())
        }
        PrimaryCode::NoPlay => {
            b.data.event_kind = EventKind::None;
            Ok(())
        }
        PrimaryCode::StolenBase
        | PrimaryCode::CaughtStealing
        | PrimaryCode::Pickoff
        | PrimaryCode::PickoffCaughtStealing
        | PrimaryCode::PickoffStolenBase => {
            b.data.event_kind = parse_baserunning(st, b, primary)?;
            parse_baserunning_chain(st, b)
        }
    }
}

/// Outs in play, written as one or more fielding sequences. A sequence
/// followed by a runner tag retires that runner; the next sequence starts
/// with a throw from whoever made the previous putout.
fn parse_generic_out(st: &mut ParserState, b: &mut EventBuilder) -> Result<(), ParseError> {
    b.data.event_kind = EventKind::GenericOut;
    let mut previous: Option<FieldingPosition> = None;
    loop {
        let run = st.fielders();
        if run.is_empty() {
            if previous.is_none() {
                return Err(st.unexpected("fielder"));
            }
            break;
        }
        let mut chain = vec![];
        if let Some(p) = previous.filter(|p| Some(p) != run.first()) {
            chain.push(p);
        }
        chain.extend(run);

        if previous.is_none() {
            b.data.fielded_by = chain[0];
            b.first_chain_len = chain.len();
        }

        if st.sym() == Some('E') {
            // An error on the throw completing the sequence: nobody is out.
            st.next_sym();
            let fielder = st.fielder()?;
            b.data.event_kind = EventKind::Error;
            b.credit_error(BaseRunner::Batter, &chain, fielder, false);
            return Ok(());
        }

        let tag = st.out_tag();
        if previous.is_none() {
            b.first_out_tag = tag;
        }
        let runner = tag.unwrap_or(BaseRunner::Batter);
        b.credit_out(runner, &chain);
        b.data.out_flag[runner.index()] = true;
        if runner != BaseRunner::Batter {
            b.data.fc_flag[runner.index()] = true;
        }
        previous = chain.last().copied();
        if tag.is_none() {
            break;
        }
    }
    if !b.data.out_flag[0] {
        // Only runners were retired, so the batter reached on the force.
        b.implied_batter = Some(Advance::First);
    }
    Ok(())
}

fn parse_hit(st: &mut ParserState, b: &mut EventBuilder, kind: EventKind) -> Result<(), ParseError> {
    b.data.event_kind = kind;
    if let Some(f) = st.fielders().first() {
        b.data.fielded_by = *f;
    }
    Ok(())
}

fn parse_free_pass(
    st: &mut ParserState,
    b: &mut EventBuilder,
    kind: EventKind,
) -> Result<(), ParseError> {
    b.data.event_kind = kind;
    if kind == EventKind::Interference {
        // Interference is usually written `C/E2`, but a bare fielder is tolerated.
        if let Some(f) = st.fielders().first() {
            b.add_error(*f, ErrorType::Fielding);
        }
    }
    if st.sym() == Some('+') {
        st.next_sym();
        parse_secondary(st, b)?;
    }
    Ok(())
}

fn parse_strikeout(st: &mut ParserState, b: &mut EventBuilder) -> Result<(), ParseError> {
    b.data.event_kind = EventKind::Strikeout;
    b.data.out_flag[0] = true;
    let fielders = st.fielders();
    if fielders.is_empty() {
        b.credit_out(BaseRunner::Batter, &[FieldingPosition::Catcher]);
        b.default_catcher_putout = true;
    } else {
        b.credit_out(BaseRunner::Batter, &fielders);
    }
    if st.sym() == Some('+') {
        st.next_sym();
        parse_secondary(st, b)?;
    }
    Ok(())
}

/// `KE<fielder>`: the third strike was not caught because of an error,
/// and the batter reaches first.
fn parse_strikeout_error(st: &mut ParserState, b: &mut EventBuilder) -> Result<(), ParseError> {
    b.data.event_kind = EventKind::Strikeout;
    let fielder = st.fielder()?;
    b.credit_error(BaseRunner::Batter, &[], fielder, false);
    b.implied_batter = Some(Advance::First);
    Ok(())
}

fn parse_error(st: &mut ParserState, b: &mut EventBuilder) -> Result<(), ParseError> {
    b.data.event_kind = EventKind::Error;
    let fielder = st.fielder()?;
    b.data.fielded_by = fielder;
    b.credit_error(BaseRunner::Batter, &[], fielder, false);
    Ok(())
}

fn parse_fielders_choice(st: &mut ParserState, b: &mut EventBuilder) -> Result<(), ParseError> {
    b.data.event_kind = EventKind::FieldersChoice;
    if let Some(f) = st.fielders().first() {
        b.data.fielded_by = *f;
        b.touch(*f);
    }
    Ok(())
}

fn parse_foul_error(st: &mut ParserState, b: &mut EventBuilder) -> Result<(), ParseError> {
    b.data.event_kind = EventKind::FoulBallError;
    b.data.foul_flag = true;
    let fielder = st.fielder()?;
    b.data.fielded_by = fielder;
    b.add_error(fielder, ErrorType::Fielding);
    b.touch(fielder);
    Ok(())
}

/// The event after a `+`, attached to a strikeout or a free pass.
fn parse_secondary(st: &mut ParserState, b: &mut EventBuilder) -> Result<(), ParseError> {
    let start = st.pos;
    let code = st.letters();
    let kind = match code.as_str() {
        "SB" => parse_baserunning(st, b, PrimaryCode::StolenBase)?,
        "CS" => parse_baserunning(st, b, PrimaryCode::CaughtStealing)?,
        "PO" => parse_baserunning(st, b, PrimaryCode::Pickoff)?,
        "POCS" => parse_baserunning(st, b, PrimaryCode::PickoffCaughtStealing)?,
        "WP" => {
            b.data.wp_flag = true;
            EventKind::WildPitch
        }
        "PB" => {
            b.data.pb_flag = true;
            EventKind::PassedBall
        }
        "OA" => EventKind::OtherAdvance,
        "DI" => EventKind::DefensiveIndifference,
        "E" => {
            // Taken as written: the digit is not checked against the defense.
            let fielder = st.fielder()?;
            b.add_error(fielder, ErrorType::Fielding);
            b.touch(fielder);
            EventKind::Error
        }
        _ => {
            st.pos = start;
            return Err(st.error(ParseErrorKind::UnknownEvent(code)));
        }
    };
    b.secondary = Some(kind);
    if matches!(
        kind,
        EventKind::StolenBase
            | EventKind::CaughtStealing
            | EventKind::Pickoff
            | EventKind::PickoffError
    ) {
        parse_baserunning_chain(st, b)?;
    }
    Ok(())
}

/// Further baserunning events on the same play, separated by `;`.
fn parse_baserunning_chain(st: &mut ParserState, b: &mut EventBuilder) -> Result<(), ParseError> {
    while st.sym() == Some(';') {
        st.next_sym();
        let start = st.pos;
        let code = st.letters();
        match PrimaryCode::from_str(&code) {
            Ok(
                primary @ (PrimaryCode::StolenBase
                | PrimaryCode::CaughtStealing
                | PrimaryCode::Pickoff
                | PrimaryCode::PickoffCaughtStealing
                | PrimaryCode::PickoffStolenBase),
            ) => {
                parse_baserunning(st, b, primary)?;
            }
            _ => {
                st.pos = start;
                return Err(st.error(ParseErrorKind::UnknownEvent(code)));
            }
        }
    }
    Ok(())
}

/// A single steal, caught stealing or pickoff, returning the event kind it
/// amounts to.
fn parse_baserunning(
    st: &mut ParserState,
    b: &mut EventBuilder,
    code: PrimaryCode,
) -> Result<EventKind, ParseError> {
    let (runner, kind) = match code {
        PrimaryCode::StolenBase | PrimaryCode::PickoffStolenBase => {
            let base = st.target_base()?;
            let runner = BaseRunner::from_target_base(base);
            b.data.sb_flag[runner.index()] = true;
            if code == PrimaryCode::PickoffStolenBase {
                b.data.po_flag[runner.index()] = true;
            }
            b.set_advance(runner, base.into());
            (runner, EventKind::StolenBase)
        }
        PrimaryCode::CaughtStealing | PrimaryCode::PickoffCaughtStealing => {
            let base = st.target_base()?;
            let runner = BaseRunner::from_target_base(base);
            b.data.cs_flag[runner.index()] = true;
            if code == PrimaryCode::PickoffCaughtStealing {
                b.data.po_flag[runner.index()] = true;
            }
            b.attempt_out(runner, base.into());
            (runner, EventKind::CaughtStealing)
        }
        _ => {
            let runner = match st.base()? {
                Base::First => BaseRunner::First,
                Base::Second => BaseRunner::Second,
                Base::Third => BaseRunner::Third,
                Base::Home => return Err(st.unexpected("occupied base")),
            };
            b.data.po_flag[runner.index()] = true;
            // A pickoff nullified by an error leaves the runner in place.
            b.attempt_out(runner, Advance::None);
            (runner, EventKind::Pickoff)
        }
    };
    while st.sym() == Some('(') {
        let contents = st.parenthetical()?;
        let out = b.out_attempt[runner.index()];
        apply_advance_modifier(b, runner, &contents, out).map_err(|k| st.error(k))?;
    }
    if kind == EventKind::Pickoff && b.data.play[runner.index()].contains('E') {
        return Ok(EventKind::PickoffError);
    }
    Ok(kind)
}

fn parse_flags(st: &mut ParserState, b: &mut EventBuilder) -> Result<(), ParseError> {
    while st.sym() == Some('/') {
        st.next_sym();
        let flag = st.take_while(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-');
        if flag.is_empty() {
            return Err(st.unexpected("modifier"));
        }
        apply_flag(b, &flag).map_err(|k| st.error(k))?;
    }
    Ok(())
}

fn apply_flag(b: &mut EventBuilder, flag: &str) -> Result<(), ParseErrorKind> {
    let d = &mut b.data;
    match flag {
        "SH" => d.sh_flag = true,
        "SF" => d.sf_flag = true,
        "DP" => d.dp_flag = true,
        "GDP" => {
            d.dp_flag = true;
            d.gdp_flag = true;
            d.batted_ball_type = Trajectory::GroundBall;
        }
        "BGDP" => {
            d.dp_flag = true;
            d.gdp_flag = true;
            d.bunt_flag = true;
            d.batted_ball_type = Trajectory::GroundBall;
        }
        "LDP" => {
            d.dp_flag = true;
            d.batted_ball_type = Trajectory::LineDrive;
        }
        "FDP" => {
            d.dp_flag = true;
            d.batted_ball_type = Trajectory::Fly;
        }
        "BPDP" => {
            d.dp_flag = true;
            d.bunt_flag = true;
            d.batted_ball_type = Trajectory::PopUp;
        }
        "TP" => d.tp_flag = true,
        "GTP" => {
            d.tp_flag = true;
            d.batted_ball_type = Trajectory::GroundBall;
        }
        "LTP" => {
            d.tp_flag = true;
            d.batted_ball_type = Trajectory::LineDrive;
        }
        "B" => d.bunt_flag = true,
        "BF" => {
            d.bunt_flag = true;
            d.foul_flag = true;
        }
        "FL" => d.foul_flag = true,
        "FO" => d.force_flag = true,
        "TH" | "THH" | "TH1" | "TH2" | "TH3" => b.mark_last_error_throwing(),
        f if NO_OP_FLAGS.contains(f) => {}
        f if f.starts_with('R') && f[1..].chars().all(|c| c.is_ascii_digit()) => {}
        f if f.starts_with('E') && f.len() == 2 => {
            let fielder = f
                .chars()
                .nth(1)
                .and_then(FieldingPosition::from_digit)
                .ok_or_else(|| ParseErrorKind::UnknownFlag(f.to_string()))?;
            b.add_error(fielder, ErrorType::Fielding);
        }
        f => apply_batted_ball_flag(b, f)?,
    }
    Ok(())
}

/// Trajectory and location flags: `G`, `F78D`, `BP2F`, `9LS`, ...
fn apply_batted_ball_flag(b: &mut EventBuilder, flag: &str) -> Result<(), ParseErrorKind> {
    let unknown = || ParseErrorKind::UnknownFlag(flag.to_string());
    let mut chars = flag.chars();
    let first = chars.next().ok_or_else(unknown)?;
    let (bunt, trajectory, location) = if first.is_ascii_digit() {
        (false, None, flag)
    } else if let Some(t) = Trajectory::from_char(first) {
        (false, Some(t), &flag[1..])
    } else if first == 'B' {
        let t = chars.next().and_then(Trajectory::from_char).ok_or_else(unknown)?;
        (true, Some(t), &flag[2..])
    } else {
        return Err(unknown());
    };
    if !location.is_empty() && !is_hit_location(location) {
        return Err(unknown());
    }
    if bunt {
        b.data.bunt_flag = true;
    }
    if let Some(t) = trajectory {
        b.data.batted_ball_type = t;
    }
    if !location.is_empty() {
        b.data.hit_location = location.to_string();
    }
    Ok(())
}

fn parse_advancement(st: &mut ParserState, b: &mut EventBuilder) -> Result<(), ParseError> {
    loop {
        parse_advance(st, b)?;
        if st.sym() == Some(';') {
            st.next_sym();
        } else {
            return Ok(());
        }
    }
}

fn parse_advance(st: &mut ParserState, b: &mut EventBuilder) -> Result<(), ParseError> {
    let runner = st.runner()?;
    let out = match st.sym() {
        Some('-') => false,
        Some('X') => true,
        _ => return Err(st.unexpected("'-' or 'X'")),
    };
    st.next_sym();
    let base = st.base()?;

    let i = runner.index();
    b.explicit[i] = true;
    b.data.advance[i] = base.into();
    b.out_attempt[i] = out;
    b.out_destination[i] = base.into();
    if !out {
        b.data.out_flag[i] = false;
        if runner == BaseRunner::Batter {
            b.remove_default_catcher_putout();
        }
    }

    while st.sym() == Some('(') {
        let contents = st.parenthetical()?;
        apply_advance_modifier(b, runner, &contents, out).map_err(|k| st.error(k))?;
    }
    Ok(())
}

/// One parenthetical attached to a runner: scoring annotations or a fielding
/// credit such as `(64)`, `(E5)`, `(2E3)` or `(E6/TH)`.
fn apply_advance_modifier(
    b: &mut EventBuilder,
    runner: BaseRunner,
    contents: &str,
    out: bool,
) -> Result<(), ParseErrorKind> {
    let i = runner.index();
    match contents {
        "UR" => b.unearned[i] = Some(Advance::ScoredUnearned),
        "TUR" => b.unearned[i] = Some(Advance::ScoredTeamUnearned),
        "NR" | "NORBI" => b.data.rbi_flag[i] = RBI_SUPPRESSED,
        "RBI" => b.data.rbi_flag[i] = RBI_EXPLICIT,
        "WP" | "PB" | "TH" | "THH" | "TH1" | "TH2" | "TH3" | "INT" | "AP" | "OBS" | "BINT"
        | "RINT" | "UINT" | "FINT" => {}
        "99" => {
            if runner == BaseRunner::Batter {
                b.remove_default_catcher_putout();
            }
            b.data.play[i] = String::from("99");
        }
        _ => apply_fielding_credit(b, runner, contents, out)?,
    }
    Ok(())
}

fn apply_fielding_credit(
    b: &mut EventBuilder,
    runner: BaseRunner,
    contents: &str,
    out: bool,
) -> Result<(), ParseErrorKind> {
    let unknown = || ParseErrorKind::UnknownAdvanceModifier(contents.to_string());
    let mut parts = contents.split('/');
    let credit = parts.next().unwrap_or_default();
    let mut throwing = false;
    for suffix in parts {
        match suffix {
            s if s.starts_with("TH") => throwing = true,
            s if NO_OP_FLAGS.contains(s) => {}
            s if s.len() == 1 && s.chars().all(|c| Trajectory::from_char(c).is_some()) => {}
            _ => return Err(unknown()),
        }
    }

    let split = credit
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(credit.len());
    let (digits, rest) = credit.split_at(split);
    let chain: Vec<FieldingPosition> = digits
        .chars()
        .map(FieldingPosition::from_digit)
        .collect::<Option<Vec<_>>>()
        .ok_or_else(unknown)?;
    let error = match rest {
        "" => None,
        e if e.len() == 2 && e.starts_with('E') => Some(
            e.chars()
                .nth(1)
                .and_then(FieldingPosition::from_digit)
                .ok_or_else(unknown)?,
        ),
        _ => return Err(unknown()),
    };
    if chain.is_empty() && error.is_none() {
        return Err(unknown());
    }

    if runner == BaseRunner::Batter {
        b.remove_default_catcher_putout();
    }
    match error {
        Some(fielder) => b.credit_error(runner, &chain, fielder, throwing),
        None if out => b.credit_out(runner, &chain),
        None => b.data.play[runner.index()] = digits.to_string(),
    }
    Ok(())
}
