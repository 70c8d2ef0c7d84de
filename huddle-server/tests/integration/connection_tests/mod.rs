mod test_disconnect_triggers_leave;
