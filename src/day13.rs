// Copyright (c) 2022 Bastiaan Marinus van de Weerd

//! Distress signal: packets of nested integer lists, compared pairwise.

use std::{cmp::Ordering, fmt};
use thiserror::Error;
use tracing::{debug, info};
use crate::cli::Challenge;

pub use parsing::{PacketError, PacketsError};


/// A packet element. Equality follows the packet order rather than the
/// structure, so `5 == [5]`; compare renderings for structural identity.
///
/// Comparing, printing and dropping recurse once per nesting level, which
/// parsing keeps within [`MAX_DEPTH`].
#[derive(Clone, Debug)]
pub enum Value {
	Int(i32),
	List(Vec<Value>),
}

impl PartialEq for Value {
	fn eq(&self, other: &Self) -> bool {
		self.cmp(other) == Ordering::Equal
	}
}

impl Eq for Value {}

impl PartialOrd for Value {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for Value {
	fn cmp(&self, other: &Self) -> Ordering {
		use {std::slice::from_ref, Value::*};
		// Slices compare element by element and the one running out first is
		// smaller, recursing back into `Value::cmp` for each pair.
		match (self, other) {
			(Int(left), Int(right)) => left.cmp(right),
			(List(left), List(right)) => left.as_slice().cmp(right.as_slice()),
			(Int(_), List(right)) => from_ref(self).cmp(right.as_slice()),
			(List(left), Int(_)) => left.as_slice().cmp(from_ref(other)),
		}
	}
}

impl fmt::Display for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		use itertools::Itertools as _;
		match self {
			Value::Int(int) => write!(f, "{int}"),
			Value::List(values) => write!(f, "[{}]", values.iter().format(",")),
		}
	}
}


/// Deepest list nesting accepted in a packet, the root list included.
pub const MAX_DEPTH: usize = 256;

/// One input line: always a list at the root.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Packet(Vec<Value>);

impl Packet {
	fn divider(int: i32) -> Self {
		Packet(vec![Value::List(vec![Value::Int(int)])])
	}
}

impl fmt::Display for Packet {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		use itertools::Itertools as _;
		write!(f, "[{}]", self.0.iter().format(","))
	}
}


#[derive(Debug, Error)]
pub enum Error {
	#[error(transparent)]
	Packet(#[from] PacketsError),
	#[error("expected an even number of packets, got {count}")]
	OddPacketCount { count: usize },
}


fn part1_impl(packets: &[Packet]) -> Result<usize, Error> {
	use itertools::Itertools as _;
	if packets.len() % 2 != 0 { return Err(Error::OddPacketCount { count: packets.len() }) }
	Ok(packets.iter()
		.tuples()
		.enumerate()
		.filter_map(|(i, (left, right))| {
			let ordering = left.cmp(right);
			debug!(pair = i + 1, ?ordering, "compared {left} with {right}");
			(ordering != Ordering::Greater).then_some(i + 1)
		})
		.sum())
}

fn part2_impl(packets: &[Packet]) -> usize {
	// A divider's sorted position is one past the number of packets ordered
	// before it; `[[6]]` additionally follows `[[2]]`.
	let [two, six] = [2, 6].map(Packet::divider);
	let two_index = packets.iter().filter(|p| **p < two).count() + 1;
	let six_index = packets.iter().filter(|p| **p < six).count() + 2;
	debug!(two_index, six_index, "located dividers");
	two_index * six_index
}

pub fn solve(challenge: Challenge, input: &str) -> Result<usize, Error> {
	let packets = parsing::packets_from_str(input).collect::<Result<Vec<_>, _>>()?;
	info!(count = packets.len(), "parsed packets");
	match challenge {
		Challenge::First => part1_impl(&packets),
		Challenge::Second => Ok(part2_impl(&packets)),
	}
}


mod parsing {
	use std::str::FromStr;
	use thiserror::Error;
	use super::{Value, Packet, MAX_DEPTH};

	#[derive(Debug, Error)]
	pub enum PacketError {
		#[error("malformed packet at column {column}: {fragment:?}")]
		MalformedPacket { column: usize, fragment: String },
		#[error("unbalanced brackets at column {column}")]
		UnbalancedBrackets { column: usize },
		#[error("list at column {column} nested deeper than {max} levels")]
		TooDeep { column: usize, max: usize },
	}

	impl FromStr for Packet {
		type Err = PacketError;
		fn from_str(s: &str) -> Result<Self, Self::Err> {
			use PacketError::*;

			// Innermost open list on top
			let mut stack: Vec<Vec<Value>> = vec![];
			let mut root = None;
			let mut int_start = None;

			// Every byte before `c` is ASCII once an error is reported, so `c`
			// is always a char boundary there.
			macro_rules! malformed { ( $start:expr, $c:expr ) => { {
				let end = $c + s[$c..].chars().next().map_or(0, char::len_utf8);
				MalformedPacket { column: $start + 1, fragment: s[$start..end].to_owned() }
			} } }

			macro_rules! push_pending_int { ( $c:expr ) => { {
				if let Some(start) = int_start.take() {
					let int = &s[start..$c];
					let int = int.parse().map_err(|_|
						MalformedPacket { column: start + 1, fragment: int.to_owned() })?;
					if let Some(values) = stack.last_mut() { values.push(Value::Int(int)) }
				}
			} } }

			for (c, b) in s.bytes().enumerate() {
				if root.is_some() {
					return Err(if b == b']' { UnbalancedBrackets { column: c + 1 } }
						else { MalformedPacket { column: c + 1, fragment: s[c..].to_owned() } })
				}
				match b {
					b'-' | b'0'..=b'9' if !stack.is_empty() => { _ = int_start.get_or_insert(c); }
					b'[' if int_start.is_none() => {
						if stack.len() == MAX_DEPTH {
							return Err(TooDeep { column: c + 1, max: MAX_DEPTH })
						}
						stack.push(vec![])
					}
					b']' => {
						push_pending_int!(c);
						let values = stack.pop().ok_or(UnbalancedBrackets { column: c + 1 })?;
						match stack.last_mut() {
							Some(outer) => outer.push(Value::List(values)),
							None => root = Some(values),
						}
					}
					b',' if !stack.is_empty() => push_pending_int!(c),
					_ => return Err(malformed!(int_start.unwrap_or(c), c)),
				}
			}

			root.map(Packet).ok_or(UnbalancedBrackets { column: s.len() + 1 })
		}
	}

	#[derive(Debug, Error)]
	#[error("line {line}: {source}")]
	pub struct PacketsError { pub line: usize, #[source] pub source: PacketError }

	/// Parses every non-blank line; blank lines only separate pairs visually.
	pub(super) fn packets_from_str(s: &str)
	-> impl Iterator<Item = Result<Packet, PacketsError>> + '_ {
		s.lines()
			.enumerate()
			.map(|(l, line)| (l, line.trim()))
			.filter(|(_, line)| !line.is_empty())
			.map(|(l, line)| line.parse()
				.map_err(|e| PacketsError { line: l + 1, source: e }))
	}
}


#[cfg(test)]
mod tests {
	use std::cmp::Ordering::{self, *};
	use test_case::test_case;
	use super::*;

	const INPUT: &str = indoc::indoc! { "
		[1,1,3,1,1]
		[1,1,5,1,1]

		[[1],[2,3,4]]
		[[1],4]

		[9]
		[[8,7,6]]

		[[4,4],4,4]
		[[4,4],4,4,4]

		[7,7,7,7]
		[7,7,7]

		[]
		[3]

		[[[]]]
		[[]]

		[1,[2,[3,[4,[5,6,7]]]],8,9]
		[1,[2,[3,[4,[5,6,0]]]],8,9]
	" };

	fn packet(s: &str) -> Packet {
		s.parse().unwrap()
	}

	fn value(s: &str) -> Value {
		let Packet(mut values) = packet(&format!("[{s}]"));
		values.remove(0)
	}

	#[test]
	fn examples() {
		assert_eq!(solve(Challenge::First, INPUT).unwrap(), 13);
		assert_eq!(solve(Challenge::Second, INPUT).unwrap(), 140);
	}

	#[test]
	fn first_two_pairs() {
		let input = indoc::indoc! { "
			[1,1,3,1,1]
			[1,1,5,1,1]

			[[1],[2,3,4]]
			[[1],4]
		" };
		assert_eq!(solve(Challenge::First, input).unwrap(), 3);
	}

	#[test_case("5", "[5]", Equal ; "int_vs_equal_list")]
	#[test_case("5", "[6]", Less ; "int_vs_larger_list")]
	#[test_case("[4,5]", "4", Greater ; "longer_list_vs_int")]
	#[test_case("[]", "[3]", Less ; "empty_vs_nonempty")]
	#[test_case("[]", "[]", Equal ; "empty_vs_empty")]
	#[test_case("[[]]", "[]", Greater ; "nested_empty_vs_empty")]
	#[test_case("-1", "0", Less ; "negative")]
	#[test_case("[[4,4],4,4]", "[[4,4],4,4,4]", Less ; "left_runs_out")]
	#[test_case("[9]", "[[8,7,6]]", Greater ; "promoted_int_larger")]
	fn compare(left: &str, right: &str, expected: Ordering) {
		assert_eq!(value(left).cmp(&value(right)), expected);
		assert_eq!(value(right).cmp(&value(left)), expected.reverse());
	}

	#[test]
	fn total_preorder() {
		use itertools::iproduct;
		let values = ["[]", "[[]]", "[[[]]]", "1", "[1]", "[1,1]", "[[1],2]", "3", "[2,[3]]", "[[2],3]", "[3,-4]"]
			.map(value);
		for (a, b) in iproduct!(&values, &values) {
			assert_eq!(a.cmp(a), Equal);
			assert_eq!(a.cmp(b), b.cmp(a).reverse(), "{a} vs {b}");
		}
		for (a, b, c) in iproduct!(&values, &values, &values) {
			if a <= b && b <= c { assert!(a <= c, "{a} <= {b} <= {c}") }
		}
	}

	mod properties {
		use std::cmp::Ordering::Equal;
		use proptest::{collection::vec, prelude::*};
		use super::super::{Packet, Value};

		fn value_strategy() -> impl Strategy<Value = Value> {
			// Few distinct integers so that ties and prefixes come up often
			(-3..4_i32).prop_map(Value::Int)
				.prop_recursive(8, 64, 4, |inner| vec(inner, 0..4).prop_map(Value::List))
		}

		fn packet_strategy() -> impl Strategy<Value = Packet> {
			vec(value_strategy(), 0..4).prop_map(Packet)
		}

		proptest! {
			#[test]
			fn rendering_round_trips(packet in packet_strategy()) {
				let rendered = packet.to_string();
				let reparsed: Packet = rendered.parse().unwrap();
				prop_assert_eq!(reparsed.to_string(), rendered);
				prop_assert_eq!(reparsed.cmp(&packet), Equal);
			}

			#[test]
			fn order_is_reflexive(a in value_strategy()) {
				prop_assert_eq!(a.cmp(&a), Equal);
			}

			#[test]
			fn order_is_antisymmetric(a in value_strategy(), b in value_strategy()) {
				prop_assert_eq!(a.cmp(&b), b.cmp(&a).reverse());
			}

			#[test]
			fn order_is_transitive(a in value_strategy(), b in value_strategy(), c in value_strategy()) {
				if a <= b && b <= c { prop_assert!(a <= c, "{} <= {} <= {}", a, b, c) }
				if a >= b && b >= c { prop_assert!(a >= c, "{} >= {} >= {}", a, b, c) }
			}
		}
	}

	fn nested(depth: usize, inner: &str) -> String {
		format!("{}{inner}{}", "[".repeat(depth), "]".repeat(depth))
	}

	#[test]
	fn deepest_packets() {
		let left = packet(&nested(MAX_DEPTH, "1"));
		let right = packet(&nested(MAX_DEPTH, "2"));
		assert_eq!(left.cmp(&right), Less);
		assert_eq!(left.to_string(), nested(MAX_DEPTH, "1"));
		let input = format!("{}\n{}\n", nested(MAX_DEPTH, ""), nested(MAX_DEPTH - 1, "[1]"));
		assert_eq!(solve(Challenge::First, &input).unwrap(), 1);
	}

	#[test_case(MAX_DEPTH + 1 ; "one_past_the_limit")]
	#[test_case(300_000 ; "far_past_the_limit")]
	fn too_deep(depth: usize) {
		assert!(matches!(nested(depth, "").parse::<Packet>(),
			Err(PacketError::TooDeep { column, max: MAX_DEPTH }) if column == MAX_DEPTH + 1));
	}

	#[test_case("[]" ; "empty")]
	#[test_case("[1,[2,[3,[4,[5,6,7]]]],8,9]" ; "deep")]
	#[test_case("[[],[[]],-12,[0,[]]]" ; "mixed")]
	fn rendering_round_trips(s: &str) {
		let rendered = packet(s).to_string();
		assert_eq!(rendered, s);
		assert_eq!(packet(&rendered).to_string(), s);
	}

	#[test]
	fn dividers_are_distinct_from_equal_packets() {
		// `[2]` orders equal to `[[2]]` without being the divider; dividers
		// go before packets they tie with.
		let packets = ["[2]", "[6]", "[1]", "[7]"].map(packet);
		assert_eq!(part2_impl(&packets), 2 * 4);
	}

	#[test_case("[1,a]", 4, "a" ; "letter")]
	#[test_case("[1-2]", 2, "1-2" ; "inner_minus")]
	#[test_case("[12[3]]", 2, "12[" ; "unterminated_int")]
	#[test_case("7", 1, "7" ; "bare_int")]
	#[test_case("[1],", 4, "," ; "trailing_comma")]
	#[test_case("[1] ", 4, " " ; "trailing_space")]
	#[test_case("[-]", 2, "-" ; "lone_minus")]
	#[test_case("[1,é]", 4, "é" ; "non_ascii")]
	fn malformed(s: &str, column: usize, fragment: &str) {
		match s.parse::<Packet>() {
			Err(PacketError::MalformedPacket { column: c, fragment: f }) => {
				assert_eq!((c, f.as_str()), (column, fragment))
			}
			r => panic!("unexpected {r:?}"),
		}
	}

	#[test_case("[[1]", 5 ; "unclosed")]
	#[test_case("[1]]", 4 ; "extra_close")]
	#[test_case("]", 1 ; "close_only")]
	#[test_case("", 1 ; "empty_line")]
	fn unbalanced(s: &str, column: usize) {
		assert!(matches!(s.parse::<Packet>(),
			Err(PacketError::UnbalancedBrackets { column: c }) if c == column));
	}

	#[test]
	fn separators_are_skipped() {
		assert_eq!(packet("[,1,,[],]").to_string(), "[1,[]]");
	}

	#[test_case("[1]\n[2]\n\n[3]\n" ; "three")]
	#[test_case("[1]\n" ; "one")]
	fn odd_packet_count(input: &str) {
		assert!(matches!(solve(Challenge::First, input),
			Err(Error::OddPacketCount { count }) if count % 2 == 1));
		assert!(solve(Challenge::Second, input).is_ok());
	}

	#[test]
	fn error_line() {
		let err = solve(Challenge::First, "[1]\n\n[2,x]\n").unwrap_err();
		assert!(matches!(err, Error::Packet(PacketsError { line: 3, .. })));
		assert_eq!(err.to_string(), "line 3: malformed packet at column 4: \"x\"");
	}
}
