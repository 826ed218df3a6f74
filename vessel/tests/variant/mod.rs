mod gadgets;
mod scenarios;
mod storage;
