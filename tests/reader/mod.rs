mod tests_diagrams;
mod tests_end_to_end;
mod tests_failures;
mod tests_unpack;
