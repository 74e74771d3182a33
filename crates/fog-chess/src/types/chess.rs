//! Chess value types shared by the rules engine, the sessions and the wire.
//!
//! These wrap shakmaty's types with serde representations that match the
//! client protocol: colors as `"white"`/`"black"`, squares as algebraic
//! strings, piece types as lowercase names (single-letter aliases accepted).

use serde::{Deserialize, Serialize};

/// Chess piece color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    /// White pieces.
    #[serde(alias = "w")]
    White,
    /// Black pieces.
    #[serde(alias = "b")]
    Black,
}

impl Color {
    /// Both colors, white first.
    pub const ALL: [Self; 2] = [Self::White, Self::Black];

    /// Get the opposite color.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    /// Returns true if this is white.
    #[must_use]
    pub const fn is_white(self) -> bool {
        matches!(self, Self::White)
    }

    /// Rank index (0-7) of this color's back rank.
    #[must_use]
    pub const fn home_rank(self) -> u8 {
        match self {
            Self::White => 0,
            Self::Black => 7,
        }
    }

    /// Rank index this color's pawns start on.
    #[must_use]
    pub const fn pawn_rank(self) -> u8 {
        match self {
            Self::White => 1,
            Self::Black => 6,
        }
    }

    /// Rank index this color's pawns promote on.
    #[must_use]
    pub const fn promotion_rank(self) -> u8 {
        self.opposite().home_rank()
    }

    /// Direction pawns of this color advance in.
    #[must_use]
    pub const fn forward(self) -> i8 {
        match self {
            Self::White => 1,
            Self::Black => -1,
        }
    }
}

impl From<shakmaty::Color> for Color {
    fn from(c: shakmaty::Color) -> Self {
        match c {
            shakmaty::Color::White => Self::White,
            shakmaty::Color::Black => Self::Black,
        }
    }
}

impl From<Color> for shakmaty::Color {
    fn from(c: Color) -> Self {
        match c {
            Color::White => Self::White,
            Color::Black => Self::Black,
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::White => write!(f, "white"),
            Self::Black => write!(f, "black"),
        }
    }
}

/// Chess piece type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceType {
    /// Pawn.
    #[serde(alias = "p")]
    Pawn,
    /// Knight.
    #[serde(alias = "n")]
    Knight,
    /// Bishop.
    #[serde(alias = "b")]
    Bishop,
    /// Rook.
    #[serde(alias = "r")]
    Rook,
    /// Queen.
    #[serde(alias = "q")]
    Queen,
    /// King.
    #[serde(alias = "k")]
    King,
}

impl PieceType {
    /// Whether a pawn may promote to this type.
    #[must_use]
    pub const fn is_promotion_target(self) -> bool {
        matches!(self, Self::Knight | Self::Bishop | Self::Rook | Self::Queen)
    }

    /// Minor pieces matter for the insufficient-material rule.
    #[must_use]
    pub const fn is_minor(self) -> bool {
        matches!(self, Self::Knight | Self::Bishop)
    }
}

impl From<shakmaty::Role> for PieceType {
    fn from(r: shakmaty::Role) -> Self {
        match r {
            shakmaty::Role::Pawn => Self::Pawn,
            shakmaty::Role::Knight => Self::Knight,
            shakmaty::Role::Bishop => Self::Bishop,
            shakmaty::Role::Rook => Self::Rook,
            shakmaty::Role::Queen => Self::Queen,
            shakmaty::Role::King => Self::King,
        }
    }
}

impl From<PieceType> for shakmaty::Role {
    fn from(p: PieceType) -> Self {
        match p {
            PieceType::Pawn => Self::Pawn,
            PieceType::Knight => Self::Knight,
            PieceType::Bishop => Self::Bishop,
            PieceType::Rook => Self::Rook,
            PieceType::Queen => Self::Queen,
            PieceType::King => Self::King,
        }
    }
}

impl std::fmt::Display for PieceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pawn => write!(f, "pawn"),
            Self::Knight => write!(f, "knight"),
            Self::Bishop => write!(f, "bishop"),
            Self::Rook => write!(f, "rook"),
            Self::Queen => write!(f, "queen"),
            Self::King => write!(f, "king"),
        }
    }
}

/// A chess piece with color and type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    /// Piece color.
    pub color: Color,
    /// Piece type.
    #[serde(rename = "type")]
    pub piece_type: PieceType,
}

impl Piece {
    /// Create a piece.
    #[must_use]
    pub const fn new(color: Color, piece_type: PieceType) -> Self {
        Self { color, piece_type }
    }
}

impl From<shakmaty::Piece> for Piece {
    fn from(p: shakmaty::Piece) -> Self {
        Self {
            color: p.color.into(),
            piece_type: p.role.into(),
        }
    }
}

impl From<Piece> for shakmaty::Piece {
    fn from(p: Piece) -> Self {
        Self {
            color: p.color.into(),
            role: p.piece_type.into(),
        }
    }
}

/// A square on the chess board (a1-h8).
///
/// Serialized as its algebraic name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Square(u8);

impl Square {
    /// Create a square from file (0-7) and rank (0-7).
    #[must_use]
    pub const fn new(file: u8, rank: u8) -> Option<Self> {
        if file < 8 && rank < 8 {
            Some(Self(rank * 8 + file))
        } else {
            None
        }
    }

    /// Get the file (0-7, a-h).
    #[must_use]
    pub const fn file(self) -> u8 {
        self.0 % 8
    }

    /// Get the rank (0-7, 1-8).
    #[must_use]
    pub const fn rank(self) -> u8 {
        self.0 / 8
    }

    /// The square `df` files and `dr` ranks away, if still on the board.
    #[must_use]
    pub fn offset(self, df: i8, dr: i8) -> Option<Self> {
        let file = i8::try_from(self.file()).ok()? + df;
        let rank = i8::try_from(self.rank()).ok()? + dr;
        Self::new(u8::try_from(file).ok()?, u8::try_from(rank).ok()?)
    }

    /// Light squares are those where file and rank parity differ.
    #[must_use]
    pub const fn is_light(self) -> bool {
        (self.file() + self.rank()) % 2 == 1
    }
}

impl From<shakmaty::Square> for Square {
    fn from(s: shakmaty::Square) -> Self {
        Self(s as u8)
    }
}

impl From<Square> for shakmaty::Square {
    fn from(s: Square) -> Self {
        // Square is always in range 0-63
        Self::new(u32::from(s.0))
    }
}

impl std::fmt::Display for Square {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let file = (b'a' + self.file()) as char;
        let rank = (b'1' + self.rank()) as char;
        write!(f, "{file}{rank}")
    }
}

impl std::str::FromStr for Square {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 2 {
            return Err("square must be 2 characters");
        }
        let mut chars = s.chars();
        let file = chars.next().ok_or("missing file")?;
        let rank = chars.next().ok_or("missing rank")?;

        if !('a'..='h').contains(&file) {
            return Err("file must be a-h");
        }
        if !('1'..='8').contains(&rank) {
            return Err("rank must be 1-8");
        }

        let file_idx = (file as u8) - b'a';
        let rank_idx = (rank as u8) - b'1';

        Self::new(file_idx, rank_idx).ok_or("invalid square")
    }
}

impl TryFrom<String> for Square {
    type Error = &'static str;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Square> for String {
    fn from(s: Square) -> Self {
        s.to_string()
    }
}

/// A pseudo-legal move as produced by the generator.
///
/// Promotion is decided when the move is applied, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    /// Source square.
    pub from: Square,
    /// Destination square.
    pub to: Square,
}

impl Move {
    /// Create a move.
    #[must_use]
    pub const fn new(from: Square, to: Square) -> Self {
        Self { from, to }
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.from, self.to)
    }
}

/// A move submitted by a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    /// Source square.
    pub from: Square,
    /// Destination square.
    pub to: Square,
    /// Promotion piece, queen when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion: Option<PieceType>,
}

impl MoveRequest {
    /// Create a request without a promotion choice.
    #[must_use]
    pub const fn new(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            promotion: None,
        }
    }

    /// Set the promotion piece.
    #[must_use]
    pub const fn promote_to(mut self, piece_type: PieceType) -> Self {
        self.promotion = Some(piece_type);
        self
    }

    /// The `{from, to}` pair checked against the generator.
    #[must_use]
    pub const fn as_move(&self) -> Move {
        Move::new(self.from, self.to)
    }
}

impl std::fmt::Display for MoveRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(p) = self.promotion {
            write!(f, "={p}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_opposite() {
        assert_eq!(Color::White.opposite(), Color::Black);
        assert_eq!(Color::Black.opposite(), Color::White);
    }

    #[test]
    fn test_color_conversion() {
        let white = Color::White;
        let shak_white: shakmaty::Color = white.into();
        assert_eq!(shak_white, shakmaty::Color::White);

        let back: Color = shak_white.into();
        assert_eq!(back, Color::White);
    }

    #[test]
    fn test_color_ranks() {
        assert_eq!(Color::White.pawn_rank(), 1);
        assert_eq!(Color::Black.pawn_rank(), 6);
        assert_eq!(Color::White.promotion_rank(), 7);
        assert_eq!(Color::Black.promotion_rank(), 0);
    }

    #[test]
    fn test_square_roundtrip() {
        let sq = Square::new(4, 3).unwrap(); // e4
        assert_eq!(sq.file(), 4);
        assert_eq!(sq.rank(), 3);
        assert_eq!(sq.to_string(), "e4");

        let parsed: Square = "e4".parse().unwrap();
        assert_eq!(parsed, sq);
    }

    #[test]
    fn test_square_bounds() {
        assert!(Square::new(0, 0).is_some()); // a1
        assert!(Square::new(7, 7).is_some()); // h8
        assert!(Square::new(8, 0).is_none());
        assert!(Square::new(0, 8).is_none());
        assert!("i2".parse::<Square>().is_err());
        assert!("e0".parse::<Square>().is_err());
    }

    #[test]
    fn test_square_offset() {
        let e4: Square = "e4".parse().unwrap();
        assert_eq!(e4.offset(1, 2).unwrap().to_string(), "f6");
        assert_eq!(e4.offset(-4, -3).unwrap().to_string(), "a1");
        assert!(e4.offset(4, 0).is_none());
        assert!(e4.offset(0, -4).is_none());
    }

    #[test]
    fn test_square_color() {
        assert!(!"a1".parse::<Square>().unwrap().is_light());
        assert!("h1".parse::<Square>().unwrap().is_light());
    }

    #[test]
    fn test_square_shakmaty_conversion() {
        let sq: Square = "g7".parse().unwrap();
        let shak: shakmaty::Square = sq.into();
        assert_eq!(shak, shakmaty::Square::G7);
        assert_eq!(Square::from(shak), sq);
    }

    #[test]
    fn test_square_serializes_as_name() {
        let sq: Square = "e2".parse().unwrap();
        assert_eq!(serde_json::to_string(&sq).unwrap(), "\"e2\"");
        let back: Square = serde_json::from_str("\"e2\"").unwrap();
        assert_eq!(back, sq);
        assert!(serde_json::from_str::<Square>("\"z9\"").is_err());
    }

    #[test]
    fn test_move_request_promotion_aliases() {
        let req: MoveRequest =
            serde_json::from_str(r#"{"from":"a7","to":"a8","promotion":"n"}"#).unwrap();
        assert_eq!(req.promotion, Some(PieceType::Knight));

        let req: MoveRequest = serde_json::from_str(r#"{"from":"e2","to":"e4"}"#).unwrap();
        assert_eq!(req.promotion, None);
        assert_eq!(req.as_move().to_string(), "e2e4");
    }

    #[test]
    fn test_piece_serializes_type_field() {
        let piece = Piece::new(Color::Black, PieceType::Queen);
        let json = serde_json::to_string(&piece).unwrap();
        assert_eq!(json, r#"{"color":"black","type":"queen"}"#);
    }
}
