// Copyright (c) 2022 Bastiaan Marinus van de Weerd


fn main() -> std::process::ExitCode {
	advent22_trees::cli::run(advent22_trees::day13::solve)
}
