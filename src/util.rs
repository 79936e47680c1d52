// Copyright (c) 2022 Bastiaan Marinus van de Weerd


/// Declares `pub mod dayNN;` for every listed day number.
macro_rules! mod_days { ( $( $day:literal ),* $(,)? ) => { paste::paste! {
	$( pub mod [<day $day>]; )*
} } }

pub(crate) use mod_days;
