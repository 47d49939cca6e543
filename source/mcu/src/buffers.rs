use common::config::TX_BUFFER_LEN;
use ringbuf::{traits::Split, HeapCons, HeapProd, HeapRb};

pub type LineProducer = HeapProd<u8>;
pub type LineConsumer = HeapCons<u8>;

/// Single-producer single-consumer byte queue between one event source and the transmitter.
pub fn line_buffer() -> (LineProducer, LineConsumer) {
    HeapRb::<u8>::new(TX_BUFFER_LEN).split()
}
