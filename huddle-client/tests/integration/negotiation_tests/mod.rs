mod test_glare;
mod test_malformed_signal;
