// Copyright (c) 2022 Bastiaan Marinus van de Weerd

//! Solvers for the Advent of Code 2022 puzzles that build a tree from their
//! input: the directory transcript of day 7 and the distress-signal packets
//! of day 13. Each day ships as its own executable under `src/bin/`.

mod util;
pub mod cli;
util::mod_days![07, 13];
