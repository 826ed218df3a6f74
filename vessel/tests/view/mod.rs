mod association;
