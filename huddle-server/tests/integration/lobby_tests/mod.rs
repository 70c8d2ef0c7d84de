mod test_create_room;
mod test_malformed_frames;
